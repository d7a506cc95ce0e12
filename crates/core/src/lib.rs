//! `panelbill-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod tier;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    CollaboratorId, CommissionRecordId, InvoiceId, InvoiceItemId, PaymentId, PayoutId,
    RepresentativeId,
};
pub use tier::{PriceTable, Tier, TierKind, TierVolumes, TIER_COUNT};
