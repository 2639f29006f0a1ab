//! Database module: secret-bearing row models and SQLite access.
//!
//! Layout:
//! - `models.rs`: row structs for the migrated tables and their update binding
//! - `schema.rs`: table names, migration queries and bootstrap DDL
//! - `sqlite.rs`: reads and transactional batch writes

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{ApplicationCredential, AuthorizationCode, SecretRecord, TokenPair};
pub use schema::SQLITE_INIT;
pub use sqlite::{BatchCompletion, SecretStore, SqlitePool};
