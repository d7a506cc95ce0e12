use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use panelbill_core::{
    CollaboratorId, CommissionRecordId, InvoiceId, InvoiceItemId, PaymentId, PayoutId,
    RepresentativeId,
};
use panelbill_invoicing::{
    CommissionPayout, CommissionRecord, CommissionStatus, Invoice, InvoiceItem, InvoiceStatus,
    NewCommissionPayout, NewCommissionRecord, NewInvoice, NewInvoiceItem, NewPayment, Payment,
};
use panelbill_parties::{
    CollaboratorUpdate, NewRepresentative, NewSalesCollaborator, Representative,
    RepresentativeUpdate, SalesCollaborator,
};

use super::r#trait::{Storage, StorageError};

#[derive(Debug, Default)]
struct Tables {
    representatives: HashMap<RepresentativeId, Representative>,
    representative_codes: HashMap<String, RepresentativeId>,
    collaborators: HashMap<CollaboratorId, SalesCollaborator>,
    invoices: HashMap<InvoiceId, Invoice>,
    invoice_numbers: HashMap<String, InvoiceId>,
    invoice_items: HashMap<InvoiceId, Vec<InvoiceItem>>,
    commissions: HashMap<InvoiceId, CommissionRecord>,
    payments: Vec<Payment>,
    payouts: Vec<CommissionPayout>,
}

/// In-memory storage backend for testing and development.
///
/// All tables live behind a single lock, so every operation observes a
/// consistent snapshot and the balance adjustments are trivially atomic.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl Storage for InMemoryStorage {
    fn representative_by_code(&self, code: &str) -> Result<Option<Representative>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .representative_codes
            .get(code)
            .and_then(|id| tables.representatives.get(id))
            .cloned())
    }

    fn create_representative(
        &self,
        data: NewRepresentative,
    ) -> Result<Representative, StorageError> {
        let mut tables = self.write()?;
        if tables.representative_codes.contains_key(&data.code) {
            return Err(StorageError::DuplicateCode(data.code));
        }

        let representative = Representative {
            id: RepresentativeId::new(),
            code: data.code,
            display_name: data.display_name,
            contact: data.contact,
            balance: 0,
            is_active: true,
            price_tiers: data.price_tiers,
            collaborator_id: data.collaborator_id,
            created_at: Utc::now(),
        };
        tables
            .representative_codes
            .insert(representative.code.clone(), representative.id);
        tables
            .representatives
            .insert(representative.id, representative.clone());
        Ok(representative)
    }

    fn update_representative(
        &self,
        id: RepresentativeId,
        update: RepresentativeUpdate,
    ) -> Result<Representative, StorageError> {
        let mut tables = self.write()?;
        let representative = tables
            .representatives
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("representative {id}")))?;

        if let Some(display_name) = update.display_name {
            representative.display_name = display_name;
        }
        if let Some(contact) = update.contact {
            representative.contact = contact;
        }
        if let Some(is_active) = update.is_active {
            representative.is_active = is_active;
        }
        if let Some(price_tiers) = update.price_tiers {
            representative.price_tiers = price_tiers;
        }
        if let Some(collaborator_id) = update.collaborator_id {
            representative.collaborator_id = collaborator_id;
        }
        Ok(representative.clone())
    }

    fn adjust_representative_balance(
        &self,
        id: RepresentativeId,
        delta: i64,
    ) -> Result<i64, StorageError> {
        let mut tables = self.write()?;
        let representative = tables
            .representatives
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("representative {id}")))?;
        representative.balance = representative
            .balance
            .checked_add(delta)
            .ok_or(StorageError::BalanceOverflow)?;
        Ok(representative.balance)
    }

    fn create_invoice(&self, data: NewInvoice) -> Result<Invoice, StorageError> {
        let mut tables = self.write()?;
        if !tables.representatives.contains_key(&data.representative_id) {
            return Err(StorageError::NotFound(format!(
                "representative {}",
                data.representative_id
            )));
        }
        if tables.invoice_numbers.contains_key(&data.number) {
            return Err(StorageError::DuplicateInvoiceNumber(data.number));
        }

        let invoice = Invoice {
            id: InvoiceId::new(),
            number: data.number,
            representative_id: data.representative_id,
            total_amount: data.total_amount,
            paid_amount: 0,
            status: InvoiceStatus::PendingPayment,
            issue_date: Utc::now(),
            due_date: data.due_date,
            source_snapshot: data.source_snapshot,
        };
        tables
            .invoice_numbers
            .insert(invoice.number.clone(), invoice.id);
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    fn create_invoice_item(&self, data: NewInvoiceItem) -> Result<InvoiceItem, StorageError> {
        let mut tables = self.write()?;
        if !tables.invoices.contains_key(&data.invoice_id) {
            return Err(StorageError::NotFound(format!(
                "invoice {}",
                data.invoice_id
            )));
        }

        let item = InvoiceItem {
            id: InvoiceItemId::new(),
            invoice_id: data.invoice_id,
            description: data.description,
            quantity: data.quantity,
            unit_price: data.unit_price,
            total: data.total,
        };
        tables
            .invoice_items
            .entry(item.invoice_id)
            .or_default()
            .push(item.clone());
        Ok(item)
    }

    fn invoices_for_representative(
        &self,
        id: RepresentativeId,
    ) -> Result<Vec<Invoice>, StorageError> {
        let tables = self.read()?;
        let mut invoices: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|invoice| invoice.representative_id == id)
            .cloned()
            .collect();
        invoices.sort_by_key(|invoice| invoice.issue_date);
        Ok(invoices)
    }

    fn invoice_items(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceItem>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .invoice_items
            .get(&invoice_id)
            .cloned()
            .unwrap_or_default())
    }

    fn collaborator(&self, id: CollaboratorId) -> Result<Option<SalesCollaborator>, StorageError> {
        let tables = self.read()?;
        Ok(tables.collaborators.get(&id).cloned())
    }

    fn create_collaborator(
        &self,
        data: NewSalesCollaborator,
    ) -> Result<SalesCollaborator, StorageError> {
        let mut tables = self.write()?;
        let collaborator = SalesCollaborator {
            id: CollaboratorId::new(),
            name: data.name,
            commission_rate: data.commission_rate,
            balance: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        tables
            .collaborators
            .insert(collaborator.id, collaborator.clone());
        Ok(collaborator)
    }

    fn update_collaborator(
        &self,
        id: CollaboratorId,
        update: CollaboratorUpdate,
    ) -> Result<SalesCollaborator, StorageError> {
        let mut tables = self.write()?;
        let collaborator = tables
            .collaborators
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("collaborator {id}")))?;

        if let Some(name) = update.name {
            collaborator.name = name;
        }
        if let Some(commission_rate) = update.commission_rate {
            collaborator.commission_rate = commission_rate;
        }
        if let Some(is_active) = update.is_active {
            collaborator.is_active = is_active;
        }
        Ok(collaborator.clone())
    }

    fn adjust_collaborator_balance(
        &self,
        id: CollaboratorId,
        delta: i64,
    ) -> Result<i64, StorageError> {
        let mut tables = self.write()?;
        let collaborator = tables
            .collaborators
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("collaborator {id}")))?;
        collaborator.balance = collaborator
            .balance
            .checked_add(delta)
            .ok_or(StorageError::BalanceOverflow)?;
        Ok(collaborator.balance)
    }

    fn create_commission_record(
        &self,
        data: NewCommissionRecord,
    ) -> Result<CommissionRecord, StorageError> {
        let mut tables = self.write()?;
        if !tables.invoices.contains_key(&data.invoice_id) {
            return Err(StorageError::NotFound(format!(
                "invoice {}",
                data.invoice_id
            )));
        }
        if !tables.collaborators.contains_key(&data.collaborator_id) {
            return Err(StorageError::NotFound(format!(
                "collaborator {}",
                data.collaborator_id
            )));
        }
        if tables.commissions.contains_key(&data.invoice_id) {
            return Err(StorageError::DuplicateCommission(data.invoice_id));
        }

        let record = CommissionRecord {
            id: CommissionRecordId::new(),
            invoice_id: data.invoice_id,
            collaborator_id: data.collaborator_id,
            commission_amount: data.commission_amount,
            commission_rate: data.commission_rate,
            status: CommissionStatus::Pending,
            calculated_at: Utc::now(),
        };
        tables.commissions.insert(record.invoice_id, record.clone());
        Ok(record)
    }

    fn commission_record_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<CommissionRecord>, StorageError> {
        let tables = self.read()?;
        Ok(tables.commissions.get(&invoice_id).cloned())
    }

    fn create_commission_payout(
        &self,
        data: NewCommissionPayout,
    ) -> Result<CommissionPayout, StorageError> {
        let mut tables = self.write()?;
        if !tables.collaborators.contains_key(&data.collaborator_id) {
            return Err(StorageError::NotFound(format!(
                "collaborator {}",
                data.collaborator_id
            )));
        }

        let payout = CommissionPayout {
            id: PayoutId::new(),
            collaborator_id: data.collaborator_id,
            amount: data.amount,
            payout_date: Utc::now(),
            reference: data.reference,
        };
        tables.payouts.push(payout.clone());
        Ok(payout)
    }

    fn create_payment(&self, data: NewPayment) -> Result<Payment, StorageError> {
        let mut tables = self.write()?;
        if !tables.representatives.contains_key(&data.representative_id) {
            return Err(StorageError::NotFound(format!(
                "representative {}",
                data.representative_id
            )));
        }

        let payment = Payment {
            id: PaymentId::new(),
            representative_id: data.representative_id,
            amount: data.amount,
            payment_date: Utc::now(),
            method: data.method,
            reference: data.reference,
            is_confirmed: true,
        };
        tables.payments.push(payment.clone());
        Ok(payment)
    }
}
