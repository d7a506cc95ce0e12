use std::sync::Arc;

use thiserror::Error;

use panelbill_core::{CollaboratorId, InvoiceId, RepresentativeId};
use panelbill_invoicing::{
    CommissionPayout, CommissionRecord, Invoice, InvoiceItem, NewCommissionPayout,
    NewCommissionRecord, NewInvoice, NewInvoiceItem, NewPayment, Payment,
};
use panelbill_parties::{
    CollaboratorUpdate, NewRepresentative, NewSalesCollaborator, Representative,
    RepresentativeUpdate, SalesCollaborator,
};

/// Storage operation error.
///
/// These are **infrastructure errors** (unique-key conflicts, missing rows,
/// backend availability) as opposed to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate representative code: {0}")]
    DuplicateCode(String),

    #[error("duplicate invoice number: {0}")]
    DuplicateInvoiceNumber(String),

    #[error("commission record already exists for invoice {0}")]
    DuplicateCommission(InvoiceId),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("balance adjustment overflow")]
    BalanceOverflow,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// The storage capability the pipeline runs against.
///
/// ## Design principles
///
/// - **No engine assumptions**: works with the in-memory implementation
///   (tests/dev) and future SQL backends (production).
/// - **Unique keys enforced here**: representative `code`, invoice `number`,
///   and one-commission-per-invoice are storage-level constraints, so every
///   implementation rejects duplicates rather than trusting callers.
/// - **Atomic balance primitives**: `adjust_*_balance` applies a signed delta
///   as one indivisible operation and returns the new balance. Concurrent
///   batch runs against the same representative must serialize through these
///   primitives; the pipeline itself processes records strictly one at a time.
pub trait Storage: Send + Sync {
    // Representatives
    fn representative_by_code(&self, code: &str) -> Result<Option<Representative>, StorageError>;
    fn create_representative(
        &self,
        data: NewRepresentative,
    ) -> Result<Representative, StorageError>;
    /// Partial update. Identity fields (`code`) are not updatable by design.
    fn update_representative(
        &self,
        id: RepresentativeId,
        update: RepresentativeUpdate,
    ) -> Result<Representative, StorageError>;
    /// Atomically apply a signed delta to the balance; returns the new balance.
    fn adjust_representative_balance(
        &self,
        id: RepresentativeId,
        delta: i64,
    ) -> Result<i64, StorageError>;

    // Invoices
    fn create_invoice(&self, data: NewInvoice) -> Result<Invoice, StorageError>;
    fn create_invoice_item(&self, data: NewInvoiceItem) -> Result<InvoiceItem, StorageError>;
    fn invoices_for_representative(
        &self,
        id: RepresentativeId,
    ) -> Result<Vec<Invoice>, StorageError>;
    fn invoice_items(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceItem>, StorageError>;

    // Collaborators and commissions
    fn collaborator(&self, id: CollaboratorId) -> Result<Option<SalesCollaborator>, StorageError>;
    fn create_collaborator(
        &self,
        data: NewSalesCollaborator,
    ) -> Result<SalesCollaborator, StorageError>;
    fn update_collaborator(
        &self,
        id: CollaboratorId,
        update: CollaboratorUpdate,
    ) -> Result<SalesCollaborator, StorageError>;
    /// Atomically apply a signed delta to the balance; returns the new balance.
    fn adjust_collaborator_balance(
        &self,
        id: CollaboratorId,
        delta: i64,
    ) -> Result<i64, StorageError>;
    fn create_commission_record(
        &self,
        data: NewCommissionRecord,
    ) -> Result<CommissionRecord, StorageError>;
    fn commission_record_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<CommissionRecord>, StorageError>;
    fn create_commission_payout(
        &self,
        data: NewCommissionPayout,
    ) -> Result<CommissionPayout, StorageError>;

    // Payments
    fn create_payment(&self, data: NewPayment) -> Result<Payment, StorageError>;
}

impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    fn representative_by_code(&self, code: &str) -> Result<Option<Representative>, StorageError> {
        (**self).representative_by_code(code)
    }

    fn create_representative(
        &self,
        data: NewRepresentative,
    ) -> Result<Representative, StorageError> {
        (**self).create_representative(data)
    }

    fn update_representative(
        &self,
        id: RepresentativeId,
        update: RepresentativeUpdate,
    ) -> Result<Representative, StorageError> {
        (**self).update_representative(id, update)
    }

    fn adjust_representative_balance(
        &self,
        id: RepresentativeId,
        delta: i64,
    ) -> Result<i64, StorageError> {
        (**self).adjust_representative_balance(id, delta)
    }

    fn create_invoice(&self, data: NewInvoice) -> Result<Invoice, StorageError> {
        (**self).create_invoice(data)
    }

    fn create_invoice_item(&self, data: NewInvoiceItem) -> Result<InvoiceItem, StorageError> {
        (**self).create_invoice_item(data)
    }

    fn invoices_for_representative(
        &self,
        id: RepresentativeId,
    ) -> Result<Vec<Invoice>, StorageError> {
        (**self).invoices_for_representative(id)
    }

    fn invoice_items(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceItem>, StorageError> {
        (**self).invoice_items(invoice_id)
    }

    fn collaborator(&self, id: CollaboratorId) -> Result<Option<SalesCollaborator>, StorageError> {
        (**self).collaborator(id)
    }

    fn create_collaborator(
        &self,
        data: NewSalesCollaborator,
    ) -> Result<SalesCollaborator, StorageError> {
        (**self).create_collaborator(data)
    }

    fn update_collaborator(
        &self,
        id: CollaboratorId,
        update: CollaboratorUpdate,
    ) -> Result<SalesCollaborator, StorageError> {
        (**self).update_collaborator(id, update)
    }

    fn adjust_collaborator_balance(
        &self,
        id: CollaboratorId,
        delta: i64,
    ) -> Result<i64, StorageError> {
        (**self).adjust_collaborator_balance(id, delta)
    }

    fn create_commission_record(
        &self,
        data: NewCommissionRecord,
    ) -> Result<CommissionRecord, StorageError> {
        (**self).create_commission_record(data)
    }

    fn commission_record_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<CommissionRecord>, StorageError> {
        (**self).commission_record_for_invoice(invoice_id)
    }

    fn create_commission_payout(
        &self,
        data: NewCommissionPayout,
    ) -> Result<CommissionPayout, StorageError> {
        (**self).create_commission_payout(data)
    }

    fn create_payment(&self, data: NewPayment) -> Result<Payment, StorageError> {
        (**self).create_payment(data)
    }
}
