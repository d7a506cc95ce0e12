use panelbill_invoicing::{CommissionRecord, Invoice, NewCommissionRecord};
use panelbill_parties::Representative;

use crate::storage::Storage;

use super::orchestrator::PipelineError;

/// Records the assigned collaborator's commission on a materialized invoice.
pub struct CommissionRecorder<S> {
    storage: S,
}

impl<S: Storage> CommissionRecorder<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Record commission for one invoice.
    ///
    /// Returns `Ok(None)` when no commission applies: the representative has
    /// no assigned collaborator, or the assignment points at a collaborator
    /// that no longer exists (logged, never fatal). Otherwise the record is
    /// written and the collaborator's balance credited atomically.
    pub fn record(
        &self,
        representative: &Representative,
        invoice: &Invoice,
    ) -> Result<Option<CommissionRecord>, PipelineError> {
        let Some(collaborator_id) = representative.collaborator_id else {
            return Ok(None);
        };
        let Some(collaborator) = self.storage.collaborator(collaborator_id)? else {
            tracing::warn!(
                %collaborator_id,
                code = %representative.code,
                "assigned collaborator not found, skipping commission"
            );
            return Ok(None);
        };

        let data = NewCommissionRecord::derive(
            invoice.id,
            collaborator.id,
            invoice.total_amount,
            collaborator.commission_rate,
        )?;
        let amount = data.commission_amount;
        let record = self.storage.create_commission_record(data)?;
        self.storage
            .adjust_collaborator_balance(collaborator.id, amount)?;

        tracing::info!(
            number = %invoice.number,
            collaborator = %collaborator.name,
            amount,
            "recorded commission"
        );
        Ok(Some(record))
    }
}
