//! Usage-export ingestion: structural validation and normalization.
//!
//! The upstream panel exports usage as JSON whose shape has drifted across
//! exporter versions. This crate owns the adapter that validates a raw payload
//! and normalizes its rows into canonical per-representative usage records.
//! Pure functions of their input: no storage, no network.

pub mod adapter;
pub mod record;

pub use adapter::ExportAdapter;
pub use record::{CanonicalUsageRecord, RepresentativeDetails};
