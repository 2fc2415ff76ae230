use serde::{Deserialize, Serialize};

use biztime_core::{CompanyCode, Entity, EntityKind, LedgerError, LedgerResult};

use crate::slug::slugify;

/// A company as stored: the canonical `{code, name, description}` projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub code: CompanyCode,
    pub name: String,
    pub description: Option<String>,
}

impl Entity for Company {
    type Id = CompanyCode;

    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

impl Company {
    /// Full replace of the mutable attributes. The code never changes.
    pub fn apply_update(&mut self, update: CompanyUpdate) {
        self.name = update.name;
        self.description = update.description;
    }
}

/// Listing row: `{code, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub code: CompanyCode,
    pub name: String,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            code: company.code.clone(),
            name: company.name.clone(),
        }
    }
}

/// Input for creating a company.
///
/// When `code` is absent (or blank) it is derived from `name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCompany {
    pub code: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

impl NewCompany {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate the input and resolve the company code.
    pub fn into_company(self) -> LedgerResult<Company> {
        let name = required_name(self.name)?;

        let code = match self.code.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => CompanyCode::parse(explicit)?,
            _ => {
                let generated = slugify(&name);
                if generated.is_empty() {
                    return Err(LedgerError::validation(format!(
                        "cannot derive a company code from name {name:?}"
                    )));
                }
                CompanyCode::new(generated)
            }
        };

        Ok(Company {
            code,
            name,
            description: self.description,
        })
    }
}

/// Full replacement of a company's mutable attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyUpdate {
    pub name: String,
    pub description: Option<String>,
}

impl CompanyUpdate {
    pub fn new(name: impl Into<String>, description: Option<String>) -> LedgerResult<Self> {
        Ok(Self {
            name: required_name(name.into())?,
            description,
        })
    }
}

fn required_name(name: String) -> LedgerResult<String> {
    if name.trim().is_empty() {
        return Err(LedgerError::validation("name cannot be empty"));
    }
    Ok(name)
}
