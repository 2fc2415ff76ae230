use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use biztime_companies::Company;
use biztime_core::InvoiceId;

use crate::store::InvoiceCompanyRow;

/// An invoice with its owning company nested under `company`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub id: InvoiceId,
    pub amt: f64,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub company: Company,
}

impl From<InvoiceCompanyRow> for InvoiceDetail {
    fn from(row: InvoiceCompanyRow) -> Self {
        Self {
            id: row.id,
            amt: row.amt,
            paid: row.paid,
            add_date: row.add_date,
            paid_date: row.paid_date,
            company: Company {
                code: row.comp_code,
                name: row.name,
                description: row.description,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use biztime_core::CompanyCode;

    use super::*;

    #[test]
    fn company_is_always_nested() {
        let row = InvoiceCompanyRow {
            id: InvoiceId::new(3),
            amt: 300.0,
            paid: true,
            add_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            paid_date: NaiveDate::from_ymd_opt(2024, 1, 9),
            comp_code: CompanyCode::new("ibm"),
            name: "IBM".to_string(),
            description: None,
        };

        let json = serde_json::to_value(InvoiceDetail::from(row)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["paid_date"], "2024-01-09");
        assert_eq!(json["company"]["code"], "ibm");
        assert_eq!(json["company"]["name"], "IBM");
        assert_eq!(json["company"]["description"], serde_json::Value::Null);
        assert!(json.get("comp_code").is_none());
    }
}
