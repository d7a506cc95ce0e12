use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use panelbill_core::{CollaboratorId, DomainError, DomainResult, Entity};

/// A sales collaborator earning commission on assigned representatives.
///
/// `commission_rate` is a fraction (`0.05` = 5%), the single convention used
/// everywhere commissions are computed or seeded. `balance` accumulates earned
/// commission and is decremented by payouts; like the representative balance
/// it is mutated only through the storage layer's atomic adjust primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesCollaborator {
    pub id: CollaboratorId,
    pub name: String,
    pub commission_rate: f64,
    pub balance: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for SalesCollaborator {
    type Id = CollaboratorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for a new sales collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSalesCollaborator {
    pub name: String,
    pub commission_rate: f64,
}

impl NewSalesCollaborator {
    pub fn new(name: impl Into<String>, commission_rate: f64) -> DomainResult<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("collaborator name cannot be empty"));
        }
        if !commission_rate.is_finite() || !(0.0..=1.0).contains(&commission_rate) {
            return Err(DomainError::validation(format!(
                "commission rate must be a fraction between 0 and 1, got {commission_rate}"
            )));
        }

        Ok(Self {
            name,
            commission_rate,
        })
    }
}

/// Partial update for an existing collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorUpdate {
    pub name: Option<String>,
    pub commission_rate: Option<f64>,
    pub is_active: Option<bool>,
}
