use crate::db::models::{ApplicationCredential, AuthorizationCode, SecretRecord, TokenPair};
use crate::db::sqlite::{BatchCompletion, SecretStore};
use crate::error::{EncryptionError, MigrationError};
use crate::service::classifier::is_already_encoded;
use crate::service::encryptor::Encryptor;
use crate::service::report::{
    MigrationReporter, MigrationState, RunSummary, SkippedRecord, TableReport, TracingReporter,
};
use std::sync::Arc;
use tracing::{debug, info};

/// The tables this tool knows how to migrate, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    ClientSecrets,
    AccessTokens,
    AuthorizationCodes,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        TableKind::ClientSecrets,
        TableKind::AccessTokens,
        TableKind::AuthorizationCodes,
    ];
}

/// Drives read → classify/encrypt → batch → commit for each secret table.
pub struct TableMigrator {
    store: SecretStore,
    encryptor: Arc<dyn Encryptor>,
    reporter: Arc<dyn MigrationReporter>,
    completion: BatchCompletion,
}

impl TableMigrator {
    pub fn new(store: SecretStore, encryptor: Arc<dyn Encryptor>) -> Self {
        Self {
            store,
            encryptor,
            reporter: Arc::new(TracingReporter),
            completion: BatchCompletion::Commit,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn MigrationReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// In dry-run mode every batch is executed and then rolled back.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.completion = if enabled {
            BatchCompletion::Rollback
        } else {
            BatchCompletion::Commit
        };
        self
    }

    pub async fn migrate_client_secrets(&self) -> Result<TableReport, MigrationError> {
        self.migrate_table::<ApplicationCredential>().await
    }

    pub async fn migrate_access_tokens(&self) -> Result<TableReport, MigrationError> {
        self.migrate_table::<TokenPair>().await
    }

    pub async fn migrate_authorization_codes(&self) -> Result<TableReport, MigrationError> {
        self.migrate_table::<AuthorizationCode>().await
    }

    pub async fn migrate(&self, kind: TableKind) -> Result<TableReport, MigrationError> {
        match kind {
            TableKind::ClientSecrets => self.migrate_client_secrets().await,
            TableKind::AccessTokens => self.migrate_access_tokens().await,
            TableKind::AuthorizationCodes => self.migrate_authorization_codes().await,
        }
    }

    /// Migrate the given tables one after another. A failed table does not
    /// stop the ones after it.
    pub async fn run_all(&self, tables: &[TableKind]) -> RunSummary {
        let mut summary = RunSummary::default();
        for kind in tables {
            summary.outcomes.push(self.migrate(*kind).await);
        }
        info!(
            tables = tables.len(),
            failed = summary.failed(),
            dry_run = self.completion == BatchCompletion::Rollback,
            "migration run complete"
        );
        summary
    }

    async fn migrate_table<R: SecretRecord>(&self) -> Result<TableReport, MigrationError> {
        let mut report = TableReport::new(R::TABLE);
        debug!(table = R::TABLE, state = %report.state, "reading rows");

        let records = self
            .store
            .read_all::<R>()
            .await
            .inspect_err(|e| self.reporter.table_failed(R::TABLE, e))?;
        report.rows_read = records.len();

        report.state = MigrationState::Classifying;
        debug!(table = R::TABLE, rows = report.rows_read, state = %report.state);
        let batch = self.encrypt_records(records, &mut report);

        report.state = MigrationState::Batching;
        report.rows_batched = batch.len();
        debug!(table = R::TABLE, rows = report.rows_batched, state = %report.state);

        report.state = MigrationState::Committing;
        match self.store.apply_batch(&batch, self.completion).await {
            Ok(affected) => {
                report.rows_affected = affected;
                report.state = match self.completion {
                    BatchCompletion::Commit => MigrationState::Committed,
                    BatchCompletion::Rollback => MigrationState::RolledBack,
                };
            }
            Err(e) => {
                report.state = MigrationState::RolledBack;
                self.reporter.table_failed(R::TABLE, &e);
                return Err(e);
            }
        }

        self.reporter.table_finished(&report);
        Ok(report)
    }

    /// Encrypt every plaintext field in place. Records with a failing field
    /// are reported and left out of the returned batch; read order is kept.
    fn encrypt_records<R: SecretRecord>(
        &self,
        records: Vec<R>,
        report: &mut TableReport,
    ) -> Vec<R> {
        let mut batch = Vec::with_capacity(records.len());
        for mut record in records {
            match self.encrypt_fields(&mut record) {
                Ok((encrypted, kept)) => {
                    report.fields_encrypted += encrypted;
                    report.fields_already_encoded += kept;
                    batch.push(record);
                }
                Err((field, error)) => {
                    let skipped = SkippedRecord {
                        id: record.id().to_string(),
                        field,
                        error,
                    };
                    self.reporter.record_skipped(R::TABLE, &skipped);
                    report.skipped.push(skipped);
                }
            }
        }
        batch
    }

    /// Returns `(encrypted, already_encoded)` field counts.
    fn encrypt_fields<R: SecretRecord>(
        &self,
        record: &mut R,
    ) -> Result<(usize, usize), (&'static str, EncryptionError)> {
        let mut encrypted = 0;
        let mut kept = 0;
        for (field, value) in record.secret_fields_mut() {
            if is_already_encoded(value) {
                kept += 1;
                continue;
            }
            *value = self.encryptor.encrypt(value).map_err(|e| (field, e))?;
            encrypted += 1;
        }
        Ok((encrypted, kept))
    }
}
