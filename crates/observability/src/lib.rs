//! Tracing and logging setup shared by pipeline hosts.
//!
//! Any binary embedding the pipeline (the batch import CLI, an API server
//! mounting `UsageExportService`) calls [`init`] once at startup before its
//! first export run; the library crates only emit events and never install a
//! subscriber themselves.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
