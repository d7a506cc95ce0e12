use serde::Serialize;

/// One record that failed processing, by representative identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub identifier: String,
    pub reason: String,
}

/// Per-run accumulator for a batch of usage records.
///
/// Every transformed record lands in exactly one bucket: invoiced, skipped
/// (inactive representative or nothing to bill), or failed. Records dropped by
/// the adapter for lacking an identifier never reach the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingReport {
    pub total_records: usize,
    pub invoices_created: usize,
    /// Policy echo: records were processed one at a time, each either fully
    /// written or reported as failed.
    pub atomic_per_record: bool,
    /// Policy echo: records were priced with each representative's own table
    /// rather than the configured default.
    pub representative_pricing_applied: bool,
    /// Codes of representatives auto-onboarded during this run.
    pub newly_onboarded: Vec<String>,
    /// Codes skipped because the representative is inactive.
    pub skipped_inactive: Vec<String>,
    /// Codes skipped because pricing produced nothing to bill.
    pub skipped_empty: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl ProcessingReport {
    pub fn new(total_records: usize) -> Self {
        Self {
            total_records,
            ..Self::default()
        }
    }

    /// A run succeeds when every record was invoiced or deliberately skipped.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_failure(&mut self, identifier: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(RecordFailure {
            identifier: identifier.into(),
            reason: reason.into(),
        });
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            success: self.is_success(),
            total_records: self.total_records,
            invoices_created: self.invoices_created,
            newly_onboarded: self.newly_onboarded.len(),
            skipped_inactive: self.skipped_inactive.len(),
            skipped_empty: self.skipped_empty.len(),
            failed: self.failures.len(),
            atomic_per_record: self.atomic_per_record,
            representative_pricing_applied: self.representative_pricing_applied,
        }
    }
}

/// Counts-only view of a [`ProcessingReport`], for API responses and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub success: bool,
    pub total_records: usize,
    pub invoices_created: usize,
    pub newly_onboarded: usize,
    pub skipped_inactive: usize,
    pub skipped_empty: usize,
    pub failed: usize,
    pub atomic_per_record: bool,
    pub representative_pricing_applied: bool,
}
