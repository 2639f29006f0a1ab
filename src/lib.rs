pub mod config;
pub mod db;
pub mod error;
pub mod service;

pub use error::{EncryptionError, MigrationError};
pub use service::classifier::is_already_encoded;
pub use service::encryptor::{ChaChaEncryptor, Encryptor};
pub use service::migrator::{TableKind, TableMigrator};
