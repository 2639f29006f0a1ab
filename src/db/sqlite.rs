use crate::db::models::SecretRecord;
use crate::db::schema::SQLITE_INIT;
use crate::error::MigrationError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::warn;

pub type SqlitePool = Pool<Sqlite>;

/// What to do with a batch transaction after every statement succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchCompletion {
    Commit,
    /// Execute everything, then roll back. Used for dry runs.
    Rollback,
}

#[derive(Clone)]
pub struct SecretStore {
    pool: SqlitePool,
}

impl SecretStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a single-connection pool; the migration never runs statements
    /// concurrently.
    pub async fn connect(database_url: &str) -> Result<Self, MigrationError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), MigrationError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Materialize every row of `R`'s table.
    pub async fn read_all<R: SecretRecord>(&self) -> Result<Vec<R>, MigrationError> {
        sqlx::query_as::<Sqlite, R>(R::SELECT)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| MigrationError::Read {
                table: R::TABLE,
                source,
            })
    }

    /// Run one update per record inside a single transaction.
    ///
    /// Any failing statement rolls back the whole batch. The transaction is
    /// also rolled back if this future is dropped before completion.
    /// Returns the number of rows the batch affected.
    pub async fn apply_batch<R: SecretRecord>(
        &self,
        records: &[R],
        completion: BatchCompletion,
    ) -> Result<u64, MigrationError> {
        let table = R::TABLE;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| MigrationError::Transaction { table, source })?;

        let mut affected = 0u64;
        for record in records {
            let result = record
                .bind_update(sqlx::query(R::UPDATE))
                .execute(&mut *tx)
                .await;
            match result {
                Ok(done) => affected += done.rows_affected(),
                Err(source) => {
                    // reported once by the caller
                    if let Err(rb) = tx.rollback().await {
                        warn!(table, error = %rb, "explicit rollback failed; connection discarded");
                    }
                    return Err(MigrationError::BatchExecution {
                        table,
                        id: record.id().to_string(),
                        source,
                    });
                }
            }
        }

        let finished = match completion {
            BatchCompletion::Commit => tx.commit().await,
            BatchCompletion::Rollback => tx.rollback().await,
        };
        finished.map_err(|source| MigrationError::Transaction { table, source })?;
        Ok(affected)
    }
}
