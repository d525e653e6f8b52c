//! Storage seam for the seeder.
//!
//! A [`SeedBackend`] opens one transaction per run; the resulting
//! [`SeedStore`] executes DDL and idempotent inserts inside it and is then
//! committed or rolled back as a whole.

mod memory;
mod postgres;

pub use memory::{MemoryBackend, MemoryRow, MemoryStore};
pub use postgres::{PgBackend, PgStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::SeedError;
use crate::schema::Table;

/// A single bound column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Text(Option<String>),
    Uuid(Option<Uuid>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Some(value.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Text(None) | Value::Uuid(None))
    }
}

/// An insert that is skipped when a row with the same unique key exists.
#[derive(Debug, Clone)]
pub struct InsertRow {
    pub table: Table,
    pub columns: Vec<(&'static str, Value)>,
}

impl InsertRow {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
        }
    }

    pub fn value(mut self, column: &'static str, value: Value) -> Self {
        self.columns.push((column, value));
        self
    }

    /// Renders the parameterized statement, returning the generated id only
    /// when a row was actually written.
    pub fn to_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("${i}")).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING RETURNING id",
            self.table.name(),
            names.join(", "),
            placeholders.join(", "),
        )
    }

    /// Renders an insert that checks the unique key itself, for tables whose
    /// unique index could not be built.
    pub fn to_guarded_sql(&self) -> String {
        let table = self.table;
        let names: Vec<&str> = self.columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("${i}")).collect();
        let conditions: Vec<String> = table
            .unique_key()
            .iter()
            .map(|column| {
                match self.columns.iter().position(|(name, _)| name == column) {
                    Some(i) if table.is_nullable(column) => {
                        format!("COALESCE({column}, '') = COALESCE(${}, '')", i + 1)
                    }
                    Some(i) => format!("{column} = ${}", i + 1),
                    None => format!("{column} IS NULL"),
                }
            })
            .collect();

        format!(
            "INSERT INTO {table} ({}) SELECT {} \
             WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {}) RETURNING id",
            names.join(", "),
            placeholders.join(", "),
            conditions.join(" AND "),
        )
    }
}

/// Operations available inside one seeding transaction.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Creates the table and its unique index if they do not exist yet.
    async fn ensure_table(&self, table: Table) -> Result<(), SeedError>;

    /// Inserts a row unless it conflicts; `None` means the insert was skipped.
    async fn insert(&self, row: InsertRow) -> Result<Option<Uuid>, SeedError>;

    async fn commit(self) -> Result<(), SeedError>
    where
        Self: Sized;

    async fn rollback(self) -> Result<(), SeedError>
    where
        Self: Sized;
}

/// Source of seeding transactions.
#[async_trait]
pub trait SeedBackend: Send + Sync {
    type Store: SeedStore;

    async fn begin(&self) -> Result<Self::Store, SeedError>;
}
