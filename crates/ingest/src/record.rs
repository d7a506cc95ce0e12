use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use panelbill_core::TierVolumes;
use panelbill_parties::ContactInfo;

/// Identity details extracted from a raw export row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeDetails {
    pub display_name: String,
    pub contact: ContactInfo,
}

/// The pipeline's working unit: one raw export row, normalized.
///
/// Constructed once per raw row by [`crate::ExportAdapter::transform`] and
/// immutable from then on. Consumed by the pricing calculator and the invoice
/// materializer; never persisted directly. Only `source_snapshot` (the
/// verbatim raw row) ends up stored, on the invoice, for audit/replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalUsageRecord {
    /// Stable external representative code. Always non-empty.
    pub representative_identifier: String,
    pub details: RepresentativeDetails,
    /// Usage volumes, one per pricing tier, non-negative.
    pub usage: TierVolumes,
    pub discount_amount: f64,
    pub additional_fee: f64,
    pub source_snapshot: JsonValue,
}
