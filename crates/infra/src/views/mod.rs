//! Nested response views assembled from flat store rows.

pub mod company;
pub mod invoice;

pub use company::{CompanyDetail, assemble_company};
pub use invoice::InvoiceDetail;
