use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use panelbill_invoicing::{Invoice, NewInvoice, NewInvoiceItem, PricedUsage};
use panelbill_parties::Representative;

use crate::storage::Storage;

use super::orchestrator::PipelineError;

/// Persists a priced usage record as an invoice.
///
/// Materializing one invoice writes the header, every line item, and the
/// representative's balance debit. The three writes happen strictly in that
/// order so that a failure never leaves a debit without its invoice.
pub struct InvoiceMaterializer<S> {
    storage: S,
    sequence: AtomicU64,
}

impl<S: Storage> InvoiceMaterializer<S> {
    pub fn new(storage: S) -> Self {
        // Millisecond seed keeps numbers unique across process restarts
        // without a persisted counter.
        let seed = Utc::now().timestamp_millis().max(0) as u64;
        Self {
            storage,
            sequence: AtomicU64::new(seed),
        }
    }

    fn next_number(&self, code: &str) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("INV-{seq}-{code}")
    }

    pub fn materialize(
        &self,
        representative: &Representative,
        priced: &PricedUsage,
        due_date: DateTime<Utc>,
        source_snapshot: JsonValue,
    ) -> Result<Invoice, PipelineError> {
        let number = self.next_number(&representative.code);
        let data = NewInvoice::try_new(
            number,
            representative.id,
            &priced.items,
            priced.total,
            due_date,
            source_snapshot,
        )?;

        let invoice = self.storage.create_invoice(data)?;
        for line in &priced.items {
            self.storage
                .create_invoice_item(NewInvoiceItem::from_line(invoice.id, line))?;
        }
        let balance = self
            .storage
            .adjust_representative_balance(representative.id, -invoice.total_amount)?;

        tracing::info!(
            number = %invoice.number,
            code = %representative.code,
            total = invoice.total_amount,
            balance,
            "materialized invoice"
        );
        Ok(invoice)
    }
}
