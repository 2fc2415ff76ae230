//! Ledger storage boundary.
//!
//! One trait, two backends: an in-memory store for tests/dev and a Postgres
//! store for production. Both enforce the same key and referential rules.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresLedgerStore;
pub use r#trait::{CompanyIndustryRow, InvoiceCompanyRow, LedgerStore};
