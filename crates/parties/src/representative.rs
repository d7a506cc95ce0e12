use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use panelbill_core::{
    CollaboratorId, DomainError, DomainResult, Entity, PriceTable, RepresentativeId,
};

/// Contact information for a representative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub mobile: Option<String>,
    pub email: Option<String>,
}

/// A representative: the billing entity invoiced for panel usage.
///
/// `code` is the stable external identifier used to join usage records to
/// representatives; it is globally unique and never changes after creation.
/// `balance` is signed: negative means the representative owes us (debt
/// accumulates as invoices are materialized, payments bring it back up).
/// Balance mutations go through the storage layer's atomic adjust primitive
/// only, never through a plain field write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub id: RepresentativeId,
    pub code: String,
    pub display_name: String,
    pub contact: ContactInfo,
    pub balance: i64,
    pub is_active: bool,
    pub price_tiers: PriceTable,
    pub collaborator_id: Option<CollaboratorId>,
    pub created_at: DateTime<Utc>,
}

impl Representative {
    /// Invariant helper: inactive representatives are skipped, not invoiced.
    pub fn can_invoice(&self) -> bool {
        self.is_active
    }
}

impl Entity for Representative {
    type Id = RepresentativeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for a new representative.
///
/// New representatives always start active with a zero balance; only creation
/// sets the identity fields (`code`, `display_name`, `contact`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRepresentative {
    pub code: String,
    pub display_name: String,
    pub contact: ContactInfo,
    pub price_tiers: PriceTable,
    pub collaborator_id: Option<CollaboratorId>,
}

impl NewRepresentative {
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        price_tiers: PriceTable,
    ) -> DomainResult<Self> {
        let code = code.into();
        let display_name = display_name.into();

        if code.trim().is_empty() {
            return Err(DomainError::validation("representative code cannot be empty"));
        }
        if display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }

        Ok(Self {
            code,
            display_name,
            contact: ContactInfo::default(),
            price_tiers,
            collaborator_id: None,
        })
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_collaborator(mut self, collaborator_id: CollaboratorId) -> Self {
        self.collaborator_id = Some(collaborator_id);
        self
    }
}

/// Partial update for an existing representative.
///
/// The `code` is deliberately absent: identity fields are set at creation and
/// never mutated afterwards. `collaborator_id` is doubly optional so that the
/// assignment can be cleared (`Some(None)`) as well as left untouched (`None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeUpdate {
    pub display_name: Option<String>,
    pub contact: Option<ContactInfo>,
    pub is_active: Option<bool>,
    pub price_tiers: Option<PriceTable>,
    pub collaborator_id: Option<Option<CollaboratorId>>,
}
