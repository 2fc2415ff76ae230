//! Strongly-typed keys used across the ledger.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Unique, immutable code of a company (e.g. `apple-inc`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyCode(String);

/// Unique code of an industry classification (e.g. `acct`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndustryCode(String);

/// System-generated invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(i32);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a code without validation (store values and URL path lookups;
            /// an unknown or blank code then fails the lookup as not found).
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            /// Validate and wrap a caller-supplied code.
            ///
            /// Surrounding whitespace is stripped; a blank code is rejected.
            pub fn parse(code: &str) -> Result<Self, LedgerError> {
                let code = code.trim();
                if code.is_empty() {
                    return Err(LedgerError::validation(concat!($name, " must not be blank")));
                }
                Ok(Self(code.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_code_newtype!(CompanyCode, "company code");
impl_code_newtype!(IndustryCode, "industry code");

impl InvoiceId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i32> for InvoiceId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<InvoiceId> for i32 {
    fn from(value: InvoiceId) -> Self {
        value.0
    }
}

impl FromStr for InvoiceId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i32>()
            .map_err(|e| LedgerError::validation(format!("invoice id {s:?}: {e}")))?;
        Ok(Self(id))
    }
}
