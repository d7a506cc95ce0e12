//! Billing parties: representatives and sales collaborators.
//!
//! Representatives are the invoiced entities (each owns a balance and a
//! per-tier price list); collaborators earn commission on the invoices of
//! representatives assigned to them. Pure domain types, no IO.

pub mod collaborator;
pub mod representative;

pub use collaborator::{CollaboratorUpdate, NewSalesCollaborator, SalesCollaborator};
pub use representative::{
    ContactInfo, NewRepresentative, Representative, RepresentativeUpdate,
};
