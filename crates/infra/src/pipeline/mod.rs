//! The usage-to-invoice pipeline.
//!
//! One batch run takes a raw export payload through four stages, strictly one
//! record at a time:
//!
//! 1. adapt: validate the payload shape and normalize rows
//!    ([`panelbill_ingest::ExportAdapter`]);
//! 2. resolve: match each record to a representative, auto-onboarding unknown
//!    codes when enabled ([`RepresentativeResolver`]);
//! 3. price and materialize: turn tier volumes into line items and persist the
//!    invoice, its items, and the balance debit ([`InvoiceMaterializer`]);
//! 4. commission: record the assigned collaborator's cut, if any
//!    ([`CommissionRecorder`]).
//!
//! A record that fails any stage is reported and the run continues; the
//! payload as a whole only fails fast when its shape is unusable.

pub mod commission;
pub mod materializer;
pub mod orchestrator;
pub mod payments;
pub mod report;
pub mod resolver;
pub mod seed;

pub use commission::CommissionRecorder;
pub use materializer::InvoiceMaterializer;
pub use orchestrator::{ExportOptions, PipelineConfig, PipelineError, UsageExportService};
pub use payments::PaymentService;
pub use report::{ExportSummary, ProcessingReport, RecordFailure};
pub use resolver::{RepresentativeResolver, Resolution};
pub use seed::seed_baseline;
