//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger layers.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The tables a failure can point at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Company,
    Industry,
    Invoice,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::Industry => "industry",
            EntityKind::Invoice => "invoice",
        }
    }

    /// Name of the key column used to address this entity.
    pub fn key_name(self) -> &'static str {
        match self {
            EntityKind::Company | EntityKind::Industry => "code",
            EntityKind::Invoice => "id",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger-level error.
///
/// Every variant carries enough context (entity kind, key) to build a precise
/// user-facing message. Mapping to transport status codes happens at the HTTP
/// boundary only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A key-based lookup or write found no matching row.
    #[error("can't find {entity} with {} of {key}", .entity.key_name())]
    NotFound { entity: EntityKind, key: String },

    /// A uniqueness or referential-integrity rule rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The underlying store failed (connectivity, unexpected driver error).
    #[error("store failure: {0}")]
    Store(String),
}

impl LedgerError {
    pub fn not_found(entity: EntityKind, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Duplicate-key failure on insert.
    pub fn already_exists(entity: EntityKind, key: impl core::fmt::Display) -> Self {
        Self::Conflict(format!(
            "{entity} with {} of {key} already exists",
            entity.key_name()
        ))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = LedgerError::not_found(EntityKind::Company, "zzz");
        assert_eq!(err.to_string(), "can't find company with code of zzz");

        let err = LedgerError::not_found(EntityKind::Invoice, 42);
        assert_eq!(err.to_string(), "can't find invoice with id of 42");
    }

    #[test]
    fn already_exists_is_a_conflict() {
        let err = LedgerError::already_exists(EntityKind::Industry, "tech");
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(err.to_string(), "conflict: industry with code of tech already exists");
    }
}
