//! Baseline seed data for development and demos.

use panelbill_core::PriceTable;
use panelbill_parties::{NewRepresentative, NewSalesCollaborator};

use crate::storage::Storage;

use super::orchestrator::PipelineError;

pub const SEED_COLLABORATOR_NAME: &str = "Sales Lead";
pub const SEED_REPRESENTATIVE_CODE: &str = "REP001";

/// Seed one collaborator at the standard 5% rate and one representative on
/// the default price table, assigned to that collaborator. Idempotent: a
/// second call against the same storage is a no-op.
pub fn seed_baseline<S: Storage>(storage: &S) -> Result<(), PipelineError> {
    if storage
        .representative_by_code(SEED_REPRESENTATIVE_CODE)?
        .is_some()
    {
        return Ok(());
    }

    let collaborator = storage
        .create_collaborator(NewSalesCollaborator::new(SEED_COLLABORATOR_NAME, 0.05)?)?;
    storage.create_representative(
        NewRepresentative::new(
            SEED_REPRESENTATIVE_CODE,
            "Demo Representative",
            PriceTable::default_pricing(),
        )?
        .with_collaborator(collaborator.id),
    )?;

    tracing::info!("seeded baseline collaborator and representative");
    Ok(())
}
