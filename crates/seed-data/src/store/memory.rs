//! In-memory storage with transactional snapshots.
//!
//! Mirrors the Postgres behaviour the seeder depends on: tables must be
//! created before use, NOT NULL columns are enforced, conflicting inserts on
//! the unique key are skipped, and nothing is visible until commit.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{InsertRow, SeedBackend, SeedStore, Value};
use crate::db::SeedError;
use crate::schema::Table;

/// A stored row.
#[derive(Debug, Clone)]
pub struct MemoryRow {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    values: HashMap<&'static str, Value>,
}

impl MemoryRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        match self.values.get(column) {
            Some(Value::Text(Some(text))) => Some(text),
            _ => None,
        }
    }

    pub fn uuid(&self, column: &str) -> Option<Uuid> {
        match self.values.get(column) {
            Some(Value::Uuid(id)) => *id,
            _ => None,
        }
    }

    pub fn int(&self, column: &str) -> Option<i32> {
        match self.values.get(column) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Unique key values, with NULL and `''` folded together like the
    /// `COALESCE(col, '')` index expression.
    fn key(&self, table: Table) -> Vec<Option<&Value>> {
        table
            .unique_key()
            .iter()
            .map(|column| {
                self.values
                    .get(column)
                    .filter(|v| !v.is_null() && **v != Value::Text(Some(String::new())))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<MemoryRow>>,
}

/// Shared in-memory database.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    committed: Arc<Mutex<MemoryState>>,
    failing: Arc<Mutex<HashSet<Table>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert into `table` fail with a storage error.
    pub fn fail_inserts_into(&self, table: Table) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(table);
        }
    }

    pub fn has_table(&self, table: Table) -> bool {
        self.committed
            .lock()
            .map(|state| state.tables.contains_key(&table))
            .unwrap_or(false)
    }

    /// Committed rows of `table`, in insertion order.
    pub fn rows(&self, table: Table) -> Vec<MemoryRow> {
        self.committed
            .lock()
            .ok()
            .and_then(|state| state.tables.get(&table).cloned())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: Table) -> usize {
        self.rows(table).len()
    }
}

#[async_trait]
impl SeedBackend for MemoryBackend {
    type Store = MemoryStore;

    async fn begin(&self) -> Result<MemoryStore, SeedError> {
        let snapshot = lock(&self.committed)?.clone();
        let failing = lock(&self.failing)?.clone();

        Ok(MemoryStore {
            committed: Arc::clone(&self.committed),
            working: Mutex::new(snapshot),
            failing,
        })
    }
}

/// One open in-memory transaction working on a private snapshot.
pub struct MemoryStore {
    committed: Arc<Mutex<MemoryState>>,
    working: Mutex<MemoryState>,
    failing: HashSet<Table>,
}

#[async_trait]
impl SeedStore for MemoryStore {
    async fn ensure_table(&self, table: Table) -> Result<(), SeedError> {
        lock(&self.working)?.tables.entry(table).or_default();
        Ok(())
    }

    async fn insert(&self, row: InsertRow) -> Result<Option<Uuid>, SeedError> {
        let table = row.table;
        if self.failing.contains(&table) {
            return Err(SeedError::Storage(format!("insert into {table} failed")));
        }

        let values: HashMap<&'static str, Value> = row.columns.into_iter().collect();
        for column in table.required_columns() {
            if values.get(column).is_none_or(Value::is_null) {
                return Err(SeedError::Storage(format!(
                    "null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"
                )));
            }
        }

        let mut state = lock(&self.working)?;
        let rows = state
            .tables
            .get_mut(&table)
            .ok_or_else(|| SeedError::Storage(format!("relation \"{table}\" does not exist")))?;

        let candidate = MemoryRow {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            values,
        };
        let key = candidate.key(table);
        if rows.iter().any(|existing| existing.key(table) == key) {
            return Ok(None);
        }

        let id = candidate.id;
        rows.push(candidate);
        Ok(Some(id))
    }

    async fn commit(self) -> Result<(), SeedError> {
        let working = self
            .working
            .into_inner()
            .map_err(|_| SeedError::Storage("memory store lock poisoned".to_string()))?;
        *lock(&self.committed)? = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), SeedError> {
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, SeedError> {
    mutex
        .lock()
        .map_err(|_| SeedError::Storage("memory store lock poisoned".to_string()))
}
