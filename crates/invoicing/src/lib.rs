//! Invoicing domain module.
//!
//! Business rules for invoices and their payment lifecycle, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod invoice;
pub mod payment;

pub use invoice::{Invoice, InvoiceListing, InvoiceSummary, InvoiceUpdate, NewInvoice};
pub use payment::{PaymentState, resolve_paid_date};
