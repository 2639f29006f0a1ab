pub mod classifier;
pub mod encryptor;
pub mod migrator;
pub mod report;
