use mimalloc::MiMalloc;
use std::sync::Arc;
use token_encryptor::config::Config;
use token_encryptor::db::SecretStore;
use token_encryptor::{ChaChaEncryptor, TableMigrator};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        loglevel = %cfg.loglevel,
        dry_run = cfg.dry_run
    );

    let encryptor = ChaChaEncryptor::from_base64_key(&cfg.encryption_key)?;
    let store = SecretStore::connect(&cfg.database_url).await?;

    let tables = cfg.tables();
    if tables.is_empty() {
        warn!("every table is disabled; nothing to migrate");
        return Ok(());
    }

    let migrator = TableMigrator::new(store, Arc::new(encryptor)).dry_run(cfg.dry_run);
    let reports = migrator.run_all(&tables).await.into_result()?;

    let affected: u64 = reports.iter().map(|r| r.rows_affected).sum();
    info!(tables = reports.len(), affected, "secrets converted");
    Ok(())
}
