//! PostgreSQL storage backed by a single sqlx transaction.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Connection, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{InsertRow, SeedBackend, SeedStore, Value};
use crate::db::SeedError;
use crate::schema::Table;

/// Opens seeding transactions on a connection pool.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SeedBackend for PgBackend {
    type Store = PgStore;

    async fn begin(&self) -> Result<PgStore, SeedError> {
        let tx = self.pool.begin().await?;
        Ok(PgStore {
            inner: Mutex::new(OpenTransaction {
                tx,
                unindexed: HashSet::new(),
            }),
        })
    }
}

struct OpenTransaction {
    tx: Transaction<'static, Postgres>,
    /// Tables whose unique index could not be built over existing rows.
    unindexed: HashSet<Table>,
}

/// One open transaction.
///
/// Statements issued concurrently are serialized on the transaction's
/// connection. Dropping the store without committing rolls it back.
pub struct PgStore {
    inner: Mutex<OpenTransaction>,
}

#[async_trait]
impl SeedStore for PgStore {
    async fn ensure_table(&self, table: Table) -> Result<(), SeedError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        sqlx::query(&table.create_sql()).execute(&mut *inner.tx).await?;

        // A failed statement aborts the whole transaction unless it runs
        // inside a savepoint.
        let mut savepoint = Connection::begin(&mut *inner.tx).await?;
        match sqlx::query(&table.unique_index_sql())
            .execute(&mut *savepoint)
            .await
        {
            Ok(_) => savepoint.commit().await?,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                savepoint.rollback().await?;
                warn!(
                    "Table {table} already holds duplicate rows, checking the seed key on insert instead: {e}"
                );
                inner.unindexed.insert(table);
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Ensured table {table}");
        Ok(())
    }

    async fn insert(&self, row: InsertRow) -> Result<Option<Uuid>, SeedError> {
        let mut inner = self.inner.lock().await;

        let sql = if inner.unindexed.contains(&row.table) {
            row.to_guarded_sql()
        } else {
            row.to_sql()
        };
        let mut query = sqlx::query_scalar::<Postgres, Uuid>(&sql);
        for (_, value) in row.columns {
            query = match value {
                Value::Int(v) => query.bind(v),
                Value::Bool(v) => query.bind(v),
                Value::Text(v) => query.bind(v),
                Value::Uuid(v) => query.bind(v),
            };
        }

        let id = query.fetch_optional(&mut *inner.tx).await?;
        Ok(id)
    }

    async fn commit(self) -> Result<(), SeedError> {
        self.inner.into_inner().tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), SeedError> {
        self.inner.into_inner().tx.rollback().await?;
        Ok(())
    }
}
