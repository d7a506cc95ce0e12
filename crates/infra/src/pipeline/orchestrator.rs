use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use panelbill_core::{DomainError, PriceTable};
use panelbill_ingest::{CanonicalUsageRecord, ExportAdapter};
use panelbill_invoicing::PricingCalculator;

use crate::storage::{Storage, StorageError};

use super::commission::CommissionRecorder;
use super::materializer::InvoiceMaterializer;
use super::report::ProcessingReport;
use super::resolver::{RepresentativeResolver, Resolution};

/// Pipeline failure, either for a whole run (unusable payload) or for one
/// record within a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid export payload: {0}")]
    InvalidPayload(String),

    #[error("unknown representative: {0}")]
    UnknownRepresentative(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Per-run processing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Onboard representatives for unknown codes instead of failing the
    /// record.
    pub auto_create_representatives: bool,
    /// Price each record with the representative's own price table; when off,
    /// every record is priced with the configured default table.
    pub apply_representative_pricing: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            auto_create_representatives: true,
            apply_representative_pricing: true,
        }
    }
}

/// Static pipeline configuration, shared by every run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Price table for auto-onboarded representatives and for runs that
    /// bypass per-representative pricing.
    pub default_pricing: PriceTable,
    /// Tax fraction applied on the adjusted subtotal.
    pub tax_rate: f64,
    /// Days from issue to due date.
    pub due_in_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_pricing: PriceTable::default_pricing(),
            tax_rate: 0.09,
            due_in_days: 30,
        }
    }
}

enum Outcome {
    Invoiced,
    SkippedInactive,
    NothingToBill,
}

/// The batch orchestrator: one export payload in, one processing report out.
///
/// Records are processed strictly in payload order, one at a time. Each
/// record either produces a complete invoice (header, items, balance debit,
/// commission) or leaves no partial writes for the stages it failed before;
/// a failed record is reported and the run moves on.
pub struct UsageExportService<S> {
    storage: S,
    config: PipelineConfig,
    calculator: PricingCalculator,
    resolver: RepresentativeResolver<S>,
    materializer: InvoiceMaterializer<S>,
    recorder: CommissionRecorder<S>,
}

impl<S: Storage + Clone> UsageExportService<S> {
    pub fn new(storage: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        let calculator = PricingCalculator::new(config.tax_rate)?;
        Ok(Self {
            resolver: RepresentativeResolver::new(storage.clone()),
            materializer: InvoiceMaterializer::new(storage.clone()),
            recorder: CommissionRecorder::new(storage.clone()),
            storage,
            config,
            calculator,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Process one export payload end to end.
    ///
    /// Fails fast only when the payload shape is unusable; everything after
    /// that is accounted per record in the returned report.
    pub fn process_usage_export(
        &self,
        payload: &JsonValue,
        options: &ExportOptions,
    ) -> Result<ProcessingReport, PipelineError> {
        if !ExportAdapter::validate(payload) {
            return Err(PipelineError::InvalidPayload(
                "payload is not an array of usage rows".to_string(),
            ));
        }

        let records = ExportAdapter::transform(payload);
        let mut report = ProcessingReport::new(records.len());
        report.atomic_per_record = true;
        report.representative_pricing_applied = options.apply_representative_pricing;
        tracing::info!(records = records.len(), "processing usage export");

        for record in &records {
            match self.process_record(record, options, &mut report) {
                Ok(Outcome::Invoiced) => report.invoices_created += 1,
                Ok(Outcome::SkippedInactive) => {
                    report
                        .skipped_inactive
                        .push(record.representative_identifier.clone());
                }
                Ok(Outcome::NothingToBill) => {
                    report
                        .skipped_empty
                        .push(record.representative_identifier.clone());
                }
                Err(err) => {
                    tracing::warn!(
                        identifier = %record.representative_identifier,
                        error = %err,
                        "failed to process usage record"
                    );
                    report.record_failure(&record.representative_identifier, err.to_string());
                }
            }
        }

        tracing::info!(summary = ?report.summary(), "usage export finished");
        Ok(report)
    }

    fn process_record(
        &self,
        record: &CanonicalUsageRecord,
        options: &ExportOptions,
        report: &mut ProcessingReport,
    ) -> Result<Outcome, PipelineError> {
        let resolution = self.resolver.resolve(
            record,
            options.auto_create_representatives,
            &self.config.default_pricing,
        )?;
        let representative = match resolution {
            Resolution::Inactive(_) => return Ok(Outcome::SkippedInactive),
            Resolution::Created(rep) => {
                report.newly_onboarded.push(rep.code.clone());
                rep
            }
            Resolution::Existing(rep) => rep,
        };

        let prices = if options.apply_representative_pricing {
            &representative.price_tiers
        } else {
            &self.config.default_pricing
        };
        let priced = self.calculator.price(
            &record.usage,
            record.discount_amount,
            record.additional_fee,
            prices,
        )?;
        if !priced.is_billable() {
            return Ok(Outcome::NothingToBill);
        }

        let due_date = chrono::Utc::now() + chrono::Duration::days(self.config.due_in_days);
        let invoice = self.materializer.materialize(
            &representative,
            &priced,
            due_date,
            record.source_snapshot.clone(),
        )?;

        self.recorder.record(&representative, &invoice)?;
        Ok(Outcome::Invoiced)
    }
}
