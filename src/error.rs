use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MigrationError {
    #[error("Failed to read rows from {table}: {source}")]
    Read {
        table: &'static str,
        #[source]
        source: SqlxError,
    },

    #[error("Batch update on {table} failed at id {id}; batch rolled back: {source}")]
    BatchExecution {
        table: &'static str,
        id: String,
        #[source]
        source: SqlxError,
    },

    #[error("Transaction control on {table} failed: {source}")]
    Transaction {
        table: &'static str,
        #[source]
        source: SqlxError,
    },

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("{failed} of {total} table migrations failed")]
    TablesFailed { failed: usize, total: usize },
}

impl From<figment::Error> for MigrationError {
    fn from(e: figment::Error) -> Self {
        MigrationError::Config(Box::new(e))
    }
}

/// Failure of the external encryption capability. Opaque to the migrator.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum EncryptionError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("cipher rejected input: {0}")]
    Rejected(String),

    #[error("encryption capability unavailable: {0}")]
    Unavailable(String),
}
