//! Commission and payment records.
//!
//! A commission record ties one invoice to the collaborator earning on it; a
//! payment credits a representative's balance; a payout debits a
//! collaborator's balance. All amounts are whole currency units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use panelbill_core::{
    CollaboratorId, CommissionRecordId, DomainError, DomainResult, Entity, InvoiceId, PaymentId,
    PayoutId, RepresentativeId,
};

/// Commission status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

/// Commission earned by a collaborator on one invoice.
///
/// At most one record exists per invoice (storage-enforced). The rate is the
/// fraction convention (`0.05` = 5%), recorded alongside the derived amount so
/// later rate changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: CommissionRecordId,
    pub invoice_id: InvoiceId,
    pub collaborator_id: CollaboratorId,
    pub commission_amount: i64,
    pub commission_rate: f64,
    pub status: CommissionStatus,
    pub calculated_at: DateTime<Utc>,
}

impl Entity for CommissionRecord {
    type Id = CommissionRecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for a commission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommissionRecord {
    pub invoice_id: InvoiceId,
    pub collaborator_id: CollaboratorId,
    pub commission_amount: i64,
    pub commission_rate: f64,
}

impl NewCommissionRecord {
    /// Derive the commission for an invoice total at a fractional rate.
    pub fn derive(
        invoice_id: InvoiceId,
        collaborator_id: CollaboratorId,
        invoice_total: i64,
        commission_rate: f64,
    ) -> DomainResult<Self> {
        if !commission_rate.is_finite() || !(0.0..=1.0).contains(&commission_rate) {
            return Err(DomainError::validation(format!(
                "commission rate must be a fraction between 0 and 1, got {commission_rate}"
            )));
        }
        if invoice_total < 0 {
            return Err(DomainError::invariant(
                "cannot derive commission from a negative invoice total",
            ));
        }

        let commission_amount = (invoice_total as f64 * commission_rate).round() as i64;

        Ok(Self {
            invoice_id,
            collaborator_id,
            commission_amount,
            commission_rate,
        })
    }
}

/// A payment received from a representative. Recording one credits the
/// representative's balance atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub representative_id: RepresentativeId,
    pub amount: i64,
    pub payment_date: DateTime<Utc>,
    pub method: String,
    pub reference: Option<String>,
    pub is_confirmed: bool,
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub representative_id: RepresentativeId,
    pub amount: i64,
    pub method: String,
    pub reference: Option<String>,
}

impl NewPayment {
    pub fn new(
        representative_id: RepresentativeId,
        amount: i64,
        method: impl Into<String>,
    ) -> DomainResult<Self> {
        let method = method.into();

        if amount <= 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if method.trim().is_empty() {
            return Err(DomainError::validation("payment method cannot be empty"));
        }

        Ok(Self {
            representative_id,
            amount,
            method,
            reference: None,
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// A payout of accumulated commission to a collaborator. Recording one debits
/// the collaborator's balance atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionPayout {
    pub id: PayoutId,
    pub collaborator_id: CollaboratorId,
    pub amount: i64,
    pub payout_date: DateTime<Utc>,
    pub reference: Option<String>,
}

impl Entity for CommissionPayout {
    type Id = PayoutId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for a commission payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommissionPayout {
    pub collaborator_id: CollaboratorId,
    pub amount: i64,
    pub reference: Option<String>,
}

impl NewCommissionPayout {
    pub fn new(collaborator_id: CollaboratorId, amount: i64) -> DomainResult<Self> {
        if amount <= 0 {
            return Err(DomainError::validation("payout amount must be positive"));
        }

        Ok(Self {
            collaborator_id,
            amount,
            reference: None,
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}
