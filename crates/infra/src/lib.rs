//! Infrastructure layer: ledger storage, response assembly, and the facade
//! the HTTP layer talks to.

pub mod ledger;
pub mod store;
pub mod views;

mod integration_tests;

pub use ledger::{Clock, Ledger};
pub use store::{InMemoryLedgerStore, LedgerStore};
#[cfg(feature = "postgres")]
pub use store::PostgresLedgerStore;
