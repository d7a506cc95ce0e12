//! Infrastructure layer: storage capability and the ingestion pipeline.

pub mod pipeline;
pub mod storage;

#[cfg(test)]
mod integration_tests;

pub use pipeline::{
    seed_baseline, CommissionRecorder, ExportOptions, ExportSummary, InvoiceMaterializer,
    PaymentService, PipelineConfig, PipelineError, ProcessingReport, RecordFailure,
    RepresentativeResolver, Resolution, UsageExportService,
};
pub use storage::{InMemoryStorage, Storage, StorageError};
