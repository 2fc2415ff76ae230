use serde::{Deserialize, Serialize};

use biztime_core::{CompanyCode, Entity, EntityKind, IndustryCode, LedgerError, LedgerResult};

/// An industry classification: `{code, industry}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub code: IndustryCode,
    pub industry: String,
}

impl Entity for Industry {
    type Id = IndustryCode;

    const KIND: EntityKind = EntityKind::Industry;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

/// Listing row: an industry plus the codes of the companies filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustrySummary {
    pub code: IndustryCode,
    pub industry: String,
    pub companies: Vec<CompanyCode>,
}

/// One row of the company/industry join relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyIndustry {
    pub company_code: CompanyCode,
    pub industry_code: IndustryCode,
}

/// Input for creating an industry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIndustry {
    pub code: String,
    pub industry: String,
}

impl NewIndustry {
    pub fn new(code: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            industry: industry.into(),
        }
    }

    pub fn into_industry(self) -> LedgerResult<Industry> {
        let code = IndustryCode::parse(&self.code)?;
        if self.industry.trim().is_empty() {
            return Err(LedgerError::validation("industry cannot be empty"));
        }
        Ok(Industry {
            code,
            industry: self.industry,
        })
    }
}
