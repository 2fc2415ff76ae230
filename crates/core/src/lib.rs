//! `biztime-core`: ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy shared by every layer and the strongly-typed keys of the
//! three ledger entities.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{EntityKind, LedgerError, LedgerResult};
pub use id::{CompanyCode, IndustryCode, InvoiceId};
