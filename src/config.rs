use crate::error::MigrationError;
use crate::service::migrator::TableKind;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable prefix, e.g. `TOKEN_ENCRYPTOR_DATABASE_URL`.
pub const ENV_PREFIX: &str = "TOKEN_ENCRYPTOR_";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub loglevel: String,
    /// Standard base64 of a 32-byte key.
    pub encryption_key: String,
    pub dry_run: bool,
    pub migrate_client_secrets: bool,
    pub migrate_access_tokens: bool,
    pub migrate_authorization_codes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://identity.db".to_string(),
            loglevel: "info".to_string(),
            encryption_key: String::new(),
            dry_run: false,
            migrate_client_secrets: true,
            migrate_access_tokens: true,
            migrate_authorization_codes: true,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("loglevel", &self.loglevel)
            .field("encryption_key", &"<redacted>")
            .field("dry_run", &self.dry_run)
            .field("migrate_client_secrets", &self.migrate_client_secrets)
            .field("migrate_access_tokens", &self.migrate_access_tokens)
            .field("migrate_authorization_codes", &self.migrate_authorization_codes)
            .finish()
    }
}

impl Config {
    /// Defaults overlaid with `TOKEN_ENCRYPTOR_*` environment variables.
    pub fn load() -> Result<Self, MigrationError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Tables enabled for this run, in run order.
    pub fn tables(&self) -> Vec<TableKind> {
        TableKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                TableKind::ClientSecrets => self.migrate_client_secrets,
                TableKind::AccessTokens => self.migrate_access_tokens,
                TableKind::AuthorizationCodes => self.migrate_authorization_codes,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_table() {
        let cfg = Config::default();
        assert_eq!(cfg.tables(), TableKind::ALL.to_vec());
        assert!(!cfg.dry_run);
    }

    #[test]
    fn disabled_tables_are_left_out() {
        let cfg = Config {
            migrate_access_tokens: false,
            ..Config::default()
        };
        assert_eq!(
            cfg.tables(),
            vec![TableKind::ClientSecrets, TableKind::AuthorizationCodes]
        );
    }

    #[test]
    fn debug_output_redacts_key() {
        let cfg = Config {
            encryption_key: "c2VjcmV0LWtleQ==".to_string(),
            ..Config::default()
        };
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("c2VjcmV0LWtleQ=="));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn figment_overrides_defaults() {
        let cfg: Config = Config::figment()
            .merge(Serialized::default("dry_run", true))
            .merge(Serialized::default("database_url", "sqlite::memory:"))
            .extract()
            .expect("extract");
        assert!(cfg.dry_run);
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.loglevel, "info");
    }
}
