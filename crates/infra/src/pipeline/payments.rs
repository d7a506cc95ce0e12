use panelbill_invoicing::{CommissionPayout, NewCommissionPayout, NewPayment, Payment};

use crate::storage::Storage;

use super::orchestrator::PipelineError;

/// Records inbound payments and outbound commission payouts, keeping the
/// affected balance in step with each record.
pub struct PaymentService<S> {
    storage: S,
}

impl<S: Storage> PaymentService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// A payment credits the representative's balance (debt moves toward
    /// zero).
    pub fn record_payment(&self, data: NewPayment) -> Result<Payment, PipelineError> {
        let payment = self.storage.create_payment(data)?;
        let balance = self
            .storage
            .adjust_representative_balance(payment.representative_id, payment.amount)?;
        tracing::info!(
            representative = %payment.representative_id,
            amount = payment.amount,
            balance,
            "recorded payment"
        );
        Ok(payment)
    }

    /// A payout debits the collaborator's accumulated commission balance.
    pub fn record_payout(
        &self,
        data: NewCommissionPayout,
    ) -> Result<CommissionPayout, PipelineError> {
        let payout = self.storage.create_commission_payout(data)?;
        let balance = self
            .storage
            .adjust_collaborator_balance(payout.collaborator_id, -payout.amount)?;
        tracing::info!(
            collaborator = %payout.collaborator_id,
            amount = payout.amount,
            balance,
            "recorded commission payout"
        );
        Ok(payout)
    }
}
