use panelbill_core::PriceTable;
use panelbill_ingest::CanonicalUsageRecord;
use panelbill_parties::{NewRepresentative, Representative};

use crate::storage::Storage;

use super::orchestrator::PipelineError;

/// How a usage record mapped to a representative.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Matched an existing active representative.
    Existing(Representative),
    /// No match existed; a representative was auto-onboarded from the record.
    Created(Representative),
    /// Matched an existing representative that is deactivated. The caller
    /// skips the record; deactivation is an explicit operator decision.
    Inactive(Representative),
}

impl Resolution {
    pub fn representative(&self) -> &Representative {
        match self {
            Resolution::Existing(rep) | Resolution::Created(rep) | Resolution::Inactive(rep) => {
                rep
            }
        }
    }
}

/// Matches canonical usage records to representatives by code.
pub struct RepresentativeResolver<S> {
    storage: S,
}

impl<S: Storage> RepresentativeResolver<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Resolve one record.
    ///
    /// Unknown codes are onboarded with the record's identity details and the
    /// given default price table when `auto_create` is on; otherwise they are
    /// a per-record error. Auto-onboarded representatives start active and are
    /// invoiced in the same run.
    pub fn resolve(
        &self,
        record: &CanonicalUsageRecord,
        auto_create: bool,
        default_pricing: &PriceTable,
    ) -> Result<Resolution, PipelineError> {
        let code = record.representative_identifier.as_str();

        if let Some(representative) = self.storage.representative_by_code(code)? {
            if !representative.can_invoice() {
                return Ok(Resolution::Inactive(representative));
            }
            return Ok(Resolution::Existing(representative));
        }

        if !auto_create {
            return Err(PipelineError::UnknownRepresentative(code.to_string()));
        }

        let data = NewRepresentative::new(
            code,
            record.details.display_name.clone(),
            default_pricing.clone(),
        )?
        .with_contact(record.details.contact.clone());
        let representative = self.storage.create_representative(data)?;
        tracing::info!(code = %representative.code, "auto-onboarded representative from export");
        Ok(Resolution::Created(representative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use panelbill_core::TierVolumes;
    use panelbill_ingest::RepresentativeDetails;
    use panelbill_parties::{ContactInfo, RepresentativeUpdate};

    use crate::storage::InMemoryStorage;

    fn record(code: &str) -> CanonicalUsageRecord {
        CanonicalUsageRecord {
            representative_identifier: code.to_string(),
            details: RepresentativeDetails {
                display_name: format!("Representative {code}"),
                contact: ContactInfo {
                    mobile: Some("0912000000".to_string()),
                    email: None,
                },
            },
            usage: TierVolumes::zero(),
            discount_amount: 0.0,
            additional_fee: 0.0,
            source_snapshot: serde_json::json!({}),
        }
    }

    #[test]
    fn unknown_code_is_onboarded_when_auto_create_is_on() {
        let storage = Arc::new(InMemoryStorage::new());
        let resolver = RepresentativeResolver::new(storage.clone());

        let resolution = resolver
            .resolve(&record("rep1"), true, &PriceTable::default_pricing())
            .unwrap();
        match resolution {
            Resolution::Created(rep) => {
                assert_eq!(rep.code, "rep1");
                assert_eq!(rep.display_name, "Representative rep1");
                assert_eq!(rep.contact.mobile.as_deref(), Some("0912000000"));
                assert_eq!(rep.price_tiers, PriceTable::default_pricing());
                assert!(rep.is_active);
                assert_eq!(rep.balance, 0);
            }
            _ => panic!("Expected Created resolution"),
        }

        assert!(storage.representative_by_code("rep1").unwrap().is_some());
    }

    #[test]
    fn unknown_code_is_an_error_when_auto_create_is_off() {
        let storage = Arc::new(InMemoryStorage::new());
        let resolver = RepresentativeResolver::new(storage);

        let err = resolver
            .resolve(&record("rep1"), false, &PriceTable::default_pricing())
            .unwrap_err();
        match err {
            PipelineError::UnknownRepresentative(code) => assert_eq!(code, "rep1"),
            _ => panic!("Expected UnknownRepresentative"),
        }
    }

    #[test]
    fn known_code_resolves_to_the_existing_representative() {
        let storage = Arc::new(InMemoryStorage::new());
        let resolver = RepresentativeResolver::new(storage.clone());

        let first = resolver
            .resolve(&record("rep1"), true, &PriceTable::default_pricing())
            .unwrap();
        let second = resolver
            .resolve(&record("rep1"), true, &PriceTable::default_pricing())
            .unwrap();

        match (first, second) {
            (Resolution::Created(a), Resolution::Existing(b)) => assert_eq!(a.id, b.id),
            _ => panic!("Expected Created then Existing"),
        }
    }

    #[test]
    fn inactive_representative_resolves_to_inactive() {
        let storage = Arc::new(InMemoryStorage::new());
        let resolver = RepresentativeResolver::new(storage.clone());

        let created = match resolver
            .resolve(&record("rep1"), true, &PriceTable::default_pricing())
            .unwrap()
        {
            Resolution::Created(rep) => rep,
            _ => panic!("Expected Created resolution"),
        };
        storage
            .update_representative(
                created.id,
                RepresentativeUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let resolution = resolver
            .resolve(&record("rep1"), true, &PriceTable::default_pricing())
            .unwrap();
        match resolution {
            Resolution::Inactive(rep) => assert_eq!(rep.id, created.id),
            _ => panic!("Expected Inactive resolution"),
        }
    }
}
