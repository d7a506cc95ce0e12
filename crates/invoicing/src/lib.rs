//! Invoicing domain module.
//!
//! This crate contains business rules for invoices, tiered usage pricing, and
//! commission/payment records, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod commission;
pub mod invoice;
pub mod pricing;

pub use commission::{
    CommissionPayout, CommissionRecord, CommissionStatus, NewCommissionPayout,
    NewCommissionRecord, NewPayment, Payment,
};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus, NewInvoice, NewInvoiceItem};
pub use pricing::{LineItem, PricedUsage, PricingCalculator};
