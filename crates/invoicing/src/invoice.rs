use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use panelbill_core::{
    DomainError, DomainResult, Entity, InvoiceId, InvoiceItemId, RepresentativeId,
};

use crate::pricing::LineItem;

/// Invoice status lifecycle.
///
/// The ingestion pipeline only ever creates invoices in `PendingPayment`;
/// later transitions (payment allocation, overdue sweep, cancellation) are
/// driven by their own flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    PendingPayment,
    Paid,
    Overdue,
    Cancelled,
}

/// An invoice materialized from one canonical usage record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    pub representative_id: RepresentativeId,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub status: InvoiceStatus,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// The raw export record this invoice was derived from, retained verbatim
    /// for audit/replay.
    pub source_snapshot: JsonValue,
}

impl Invoice {
    pub fn outstanding_amount(&self) -> i64 {
        self.total_amount.saturating_sub(self.paid_amount)
    }

    /// Invariant: cannot pay a cancelled invoice.
    pub fn can_accept_payment(&self) -> bool {
        self.status != InvoiceStatus::Cancelled && self.outstanding_amount() > 0
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for an invoice header.
///
/// Constructed through [`NewInvoice::try_new`], which enforces the core
/// invariant: `total_amount` equals the exact sum of the line totals, computed
/// once at creation and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub number: String,
    pub representative_id: RepresentativeId,
    pub total_amount: i64,
    pub due_date: DateTime<Utc>,
    pub source_snapshot: JsonValue,
}

impl NewInvoice {
    pub fn try_new(
        number: impl Into<String>,
        representative_id: RepresentativeId,
        lines: &[LineItem],
        total_amount: i64,
        due_date: DateTime<Utc>,
        source_snapshot: JsonValue,
    ) -> DomainResult<Self> {
        let number = number.into();

        if number.trim().is_empty() {
            return Err(DomainError::validation("invoice number cannot be empty"));
        }
        if lines.is_empty() {
            return Err(DomainError::validation(
                "cannot create an invoice without line items",
            ));
        }
        if total_amount < 0 {
            return Err(DomainError::invariant(format!(
                "invoice total cannot be negative: {total_amount}"
            )));
        }

        let mut sum: i64 = 0;
        for line in lines {
            sum = sum
                .checked_add(line.total)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
        }
        if sum != total_amount {
            return Err(DomainError::invariant(format!(
                "invoice total {total_amount} does not equal line item sum {sum}"
            )));
        }

        Ok(Self {
            number,
            representative_id,
            total_amount,
            due_date,
            source_snapshot,
        })
    }
}

/// A persisted invoice line item. Belongs to exactly one invoice and is only
/// ever created alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    pub description: String,
    pub quantity: f64,
    /// Signed: negative for discount lines.
    pub unit_price: i64,
    pub total: i64,
}

impl Entity for InvoiceItem {
    type Id = InvoiceItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Insert payload for an invoice line item, bound to its generated invoice id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoiceItem {
    pub invoice_id: InvoiceId,
    pub description: String,
    pub quantity: f64,
    pub unit_price: i64,
    pub total: i64,
}

impl NewInvoiceItem {
    /// Bind a priced line to the invoice header it belongs to.
    pub fn from_line(invoice_id: InvoiceId, line: &LineItem) -> Self {
        Self {
            invoice_id,
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: line.total,
        }
    }
}
