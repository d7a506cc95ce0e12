//! The export schema adapter.
//!
//! Two top-level payload shapes are tolerated, reflecting how the upstream
//! exporter has changed over time:
//!
//! - legacy: a flat array of row objects, each carrying an identifier field
//!   and up to twelve tier-volume fields;
//! - wrapped: an array of `{ "type": "table", "data": [...] }` objects whose
//!   inner `data` arrays hold the same row shape.
//!
//! Both validate and transform identically once unwrapped.

use serde_json::Value as JsonValue;

use panelbill_core::{Tier, TierKind, TierVolumes};
use panelbill_parties::ContactInfo;

use crate::record::{CanonicalUsageRecord, RepresentativeDetails};

const IDENTIFIER_FIELDS: [&str; 2] = ["admin_username", "username"];
const DISPLAY_NAME_FIELDS: [&str; 2] = ["full_name", "persian_name"];
const MOBILE_FIELDS: [&str; 2] = ["mobile", "phone"];
const EMAIL_FIELD: &str = "email";
const DISCOUNT_FIELD: &str = "discount";
const ADDITIONAL_FEE_FIELD: &str = "additional_fee";

/// Validates and normalizes raw export payloads.
pub struct ExportAdapter;

impl ExportAdapter {
    /// Structural validation of a whole payload.
    ///
    /// Returns `false` (never errors) for non-array input and for arrays in
    /// which no element exhibits the minimum expected shape; the caller
    /// decides whether to abort. Calling twice on the same payload yields the
    /// same result.
    pub fn validate(payload: &JsonValue) -> bool {
        let Some(elements) = payload.as_array() else {
            return false;
        };

        elements
            .iter()
            .any(|element| Self::is_usable_row(element) || Self::is_usable_wrapper(element))
    }

    /// Normalize every raw element with a usable identifier into a canonical
    /// usage record, in payload order.
    ///
    /// Numeric fields are parsed permissively: absent, unparsable, or negative
    /// values become zero, and no single bad field ever fails the row. Rows
    /// lacking any identifier are dropped without a trace.
    pub fn transform(payload: &JsonValue) -> Vec<CanonicalUsageRecord> {
        let Some(elements) = payload.as_array() else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for element in elements {
            if let Some(rows) = Self::wrapper_rows(element) {
                for row in rows {
                    if let Some(record) = Self::transform_row(row) {
                        records.push(record);
                    }
                }
            } else if let Some(record) = Self::transform_row(element) {
                records.push(record);
            }
        }
        records
    }

    fn transform_row(row: &JsonValue) -> Option<CanonicalUsageRecord> {
        let identifier = Self::identifier(row)?;

        let display_name = DISPLAY_NAME_FIELDS
            .iter()
            .find_map(|field| non_empty_string(row.get(*field)))
            .unwrap_or_else(|| identifier.clone());

        let contact = ContactInfo {
            mobile: MOBILE_FIELDS
                .iter()
                .find_map(|field| non_empty_string(row.get(*field))),
            email: non_empty_string(row.get(EMAIL_FIELD)),
        };

        let mut volumes = TierVolumes::zero();
        for tier in Tier::all() {
            volumes.set(tier, lenient_number(row.get(tier_volume_field(tier).as_str())));
        }

        Some(CanonicalUsageRecord {
            representative_identifier: identifier,
            details: RepresentativeDetails {
                display_name,
                contact,
            },
            usage: volumes,
            discount_amount: lenient_number(row.get(DISCOUNT_FIELD)).max(0.0),
            additional_fee: lenient_number(row.get(ADDITIONAL_FEE_FIELD)).max(0.0),
            source_snapshot: row.clone(),
        })
    }

    fn identifier(row: &JsonValue) -> Option<String> {
        if !row.is_object() {
            return None;
        }
        IDENTIFIER_FIELDS
            .iter()
            .find_map(|field| non_empty_string(row.get(*field)))
    }

    /// Minimum row shape: an identifier plus at least one tier-volume field.
    fn is_usable_row(element: &JsonValue) -> bool {
        Self::identifier(element).is_some()
            && Tier::all().any(|tier| element.get(tier_volume_field(tier).as_str()).is_some())
    }

    /// Minimum wrapper shape: `{type: "table", data: [...]}` with at least one
    /// identifiable inner row.
    fn is_usable_wrapper(element: &JsonValue) -> bool {
        Self::wrapper_rows(element)
            .map(|rows| rows.iter().any(|row| Self::identifier(row).is_some()))
            .unwrap_or(false)
    }

    fn wrapper_rows(element: &JsonValue) -> Option<&Vec<JsonValue>> {
        if element.get("type").and_then(JsonValue::as_str) != Some("table") {
            return None;
        }
        element.get("data").and_then(JsonValue::as_array)
    }
}

/// Export field name for one tier's volume.
fn tier_volume_field(tier: Tier) -> String {
    match tier.kind() {
        TierKind::Metered => format!("limited_{}_month_volume", tier.duration_months()),
        TierKind::Unlimited => format!("unlimited_{}_month", tier.duration_months()),
    }
}

fn non_empty_string(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Permissive numeric coercion: numbers pass through, strings are parsed,
/// anything else (or a parse failure) is zero.
fn lenient_number(value: Option<&JsonValue>) -> f64 {
    match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_payload() -> JsonValue {
        json!([
            {
                "admin_username": "rep1",
                "limited_1_month_volume": "10",
                "unlimited_1_month": "0"
            }
        ])
    }

    fn wrapped_payload() -> JsonValue {
        json!([
            {
                "type": "table",
                "data": [
                    {
                        "admin_username": "rep1",
                        "limited_1_month_volume": "10",
                        "unlimited_1_month": "0"
                    }
                ]
            }
        ])
    }

    #[test]
    fn validate_rejects_non_array_payload() {
        assert!(!ExportAdapter::validate(&json!({"admin_username": "rep1"})));
        assert!(!ExportAdapter::validate(&json!("rep1")));
        assert!(!ExportAdapter::validate(&json!(null)));
    }

    #[test]
    fn validate_rejects_rows_without_expected_shape() {
        assert!(!ExportAdapter::validate(&json!([])));
        assert!(!ExportAdapter::validate(&json!([{"foo": "bar"}])));
        // Identifier alone is not enough: a volume-like field must be present.
        assert!(!ExportAdapter::validate(&json!([{"admin_username": "rep1"}])));
    }

    #[test]
    fn validate_accepts_legacy_and_wrapped_shapes() {
        assert!(ExportAdapter::validate(&legacy_payload()));
        assert!(ExportAdapter::validate(&wrapped_payload()));
    }

    #[test]
    fn validate_is_idempotent() {
        let payload = legacy_payload();
        assert_eq!(
            ExportAdapter::validate(&payload),
            ExportAdapter::validate(&payload)
        );

        let bad = json!({"not": "an array"});
        assert_eq!(ExportAdapter::validate(&bad), ExportAdapter::validate(&bad));
    }

    #[test]
    fn transform_normalizes_a_legacy_row() {
        let records = ExportAdapter::transform(&legacy_payload());
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.representative_identifier, "rep1");
        assert_eq!(record.details.display_name, "rep1");
        assert_eq!(record.usage.get(Tier::from_index(0).unwrap()), 10.0);
        assert!(record
            .usage
            .iter()
            .skip(1)
            .all(|(_, volume)| volume == 0.0));
        assert_eq!(record.discount_amount, 0.0);
        assert_eq!(record.additional_fee, 0.0);
    }

    #[test]
    fn transform_unwraps_table_wrappers_identically() {
        let legacy = ExportAdapter::transform(&legacy_payload());
        let wrapped = ExportAdapter::transform(&wrapped_payload());
        // Snapshots are the inner rows in both cases, so records compare equal.
        assert_eq!(legacy, wrapped);
    }

    #[test]
    fn transform_drops_rows_without_identifier_silently() {
        let payload = json!([
            {},
            {"full_name": "No Identifier", "limited_1_month_volume": "5"},
            {"admin_username": "rep2", "limited_1_month_volume": "3"}
        ]);
        let records = ExportAdapter::transform(&payload);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].representative_identifier, "rep2");
    }

    #[test]
    fn transform_coerces_bad_numerics_to_zero() {
        let payload = json!([
            {
                "admin_username": "rep1",
                "limited_1_month_volume": "not-a-number",
                "limited_2_month_volume": 4,
                "limited_3_month_volume": "-7",
                "unlimited_1_month": "2.5",
                "discount": "oops",
                "additional_fee": "150"
            }
        ]);
        let records = ExportAdapter::transform(&payload);
        let record = &records[0];

        assert_eq!(record.usage.get(Tier::from_index(0).unwrap()), 0.0);
        assert_eq!(record.usage.get(Tier::from_index(1).unwrap()), 4.0);
        // Negative volumes clamp to zero.
        assert_eq!(record.usage.get(Tier::from_index(2).unwrap()), 0.0);
        assert_eq!(record.usage.get(Tier::from_index(6).unwrap()), 2.5);
        assert_eq!(record.discount_amount, 0.0);
        assert_eq!(record.additional_fee, 150.0);
    }

    #[test]
    fn transform_prefers_full_name_and_falls_back_to_identifier() {
        let payload = json!([
            {"admin_username": "rep1", "full_name": "Rep One", "limited_1_month_volume": "1"},
            {"username": "rep2", "limited_1_month_volume": "1"}
        ]);
        let records = ExportAdapter::transform(&payload);
        assert_eq!(records[0].details.display_name, "Rep One");
        assert_eq!(records[1].details.display_name, "rep2");
    }

    #[test]
    fn transform_extracts_contact_aliases() {
        let payload = json!([
            {"admin_username": "rep1", "phone": "0912000000", "email": "rep1@example.com", "limited_1_month_volume": "1"}
        ]);
        let records = ExportAdapter::transform(&payload);
        let contact = &records[0].details.contact;
        assert_eq!(contact.mobile.as_deref(), Some("0912000000"));
        assert_eq!(contact.email.as_deref(), Some("rep1@example.com"));
    }

    #[test]
    fn transform_retains_the_verbatim_source_snapshot() {
        let payload = legacy_payload();
        let records = ExportAdapter::transform(&payload);
        assert_eq!(records[0].source_snapshot, payload[0]);
    }

    #[test]
    fn transform_of_non_array_payload_is_empty() {
        assert!(ExportAdapter::transform(&json!({"admin_username": "rep1"})).is_empty());
    }
}
