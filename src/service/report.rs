use crate::error::{EncryptionError, MigrationError};
use std::fmt;
use tracing::{error, info, warn};

/// Per-table migration state. Terminal states are `Committed` and `RolledBack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    ReadPending,
    Classifying,
    Batching,
    Committing,
    Committed,
    RolledBack,
}

impl MigrationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ReadPending => "read_pending",
            Self::Classifying => "classifying",
            Self::Batching => "batching",
            Self::Committing => "committing",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(s)
    }
}

/// A record left out of the batch because one of its fields failed to encrypt.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub id: String,
    pub field: &'static str,
    pub error: EncryptionError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub table: &'static str,
    pub state: MigrationState,
    pub rows_read: usize,
    pub fields_encrypted: usize,
    pub fields_already_encoded: usize,
    pub skipped: Vec<SkippedRecord>,
    pub rows_batched: usize,
    pub rows_affected: u64,
}

impl TableReport {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            state: MigrationState::ReadPending,
            rows_read: 0,
            fields_encrypted: 0,
            fields_already_encoded: 0,
            skipped: Vec::new(),
            rows_batched: 0,
            rows_affected: 0,
        }
    }

    /// Rows read but not written, whether skipped or missing at write time.
    pub fn discrepancy(&self) -> u64 {
        (self.rows_read as u64).saturating_sub(self.rows_affected)
    }
}

/// Receives progress and completion signals from the table migrator.
pub trait MigrationReporter: Send + Sync {
    fn record_skipped(&self, table: &'static str, skipped: &SkippedRecord);
    fn table_finished(&self, report: &TableReport);
    fn table_failed(&self, table: &'static str, error: &MigrationError);
}

/// Default reporter writing to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl MigrationReporter for TracingReporter {
    fn record_skipped(&self, table: &'static str, skipped: &SkippedRecord) {
        warn!(
            table,
            id = %skipped.id,
            field = skipped.field,
            error = %skipped.error,
            "encryption failed; record excluded from batch"
        );
    }

    fn table_finished(&self, report: &TableReport) {
        info!(
            table = report.table,
            state = %report.state,
            read = report.rows_read,
            encrypted = report.fields_encrypted,
            already_encoded = report.fields_already_encoded,
            skipped = report.skipped.len(),
            affected = report.rows_affected,
            "table migration finished"
        );
        if report.discrepancy() > 0 {
            warn!(
                table = report.table,
                read = report.rows_read,
                affected = report.rows_affected,
                "not every row read was written; reprocess the skipped ids"
            );
        }
    }

    fn table_failed(&self, table: &'static str, error: &MigrationError) {
        error!(table, error = %error, "table migration failed");
    }
}

/// Outcome of migrating a set of tables, one entry per table in run order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<Result<TableReport, MigrationError>>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_err()).count()
    }

    /// Collapse into the job result: `Err` when any table failed.
    pub fn into_result(self) -> Result<Vec<TableReport>, MigrationError> {
        let total = self.outcomes.len();
        let failed = self.failed();
        if failed > 0 {
            return Err(MigrationError::TablesFailed { failed, total });
        }
        Ok(self.outcomes.into_iter().filter_map(Result::ok).collect())
    }
}
