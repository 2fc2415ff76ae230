use serde::{Deserialize, Serialize};

use biztime_core::CompanyCode;
use biztime_invoicing::InvoiceSummary;

use crate::store::CompanyIndustryRow;

/// A company with its industry labels and invoice summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    pub code: CompanyCode,
    pub name: String,
    pub description: Option<String>,
    pub industries: Vec<String>,
    pub invoices: Vec<InvoiceSummary>,
}

/// Fold the company/industry join rows into one detail view.
///
/// Company attributes come from the first row. Industry labels keep row order;
/// the null label produced by a company with no industries is skipped.
/// Returns `None` for an empty row set.
pub fn assemble_company(
    rows: Vec<CompanyIndustryRow>,
    invoices: Vec<InvoiceSummary>,
) -> Option<CompanyDetail> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let mut industries: Vec<String> = first.industry.into_iter().collect();
    industries.extend(rows.filter_map(|row| row.industry));

    Some(CompanyDetail {
        code: first.code,
        name: first.name,
        description: first.description,
        industries,
        invoices,
    })
}

#[cfg(test)]
mod tests {
    use biztime_core::InvoiceId;

    use super::*;

    fn row(industry: Option<&str>) -> CompanyIndustryRow {
        CompanyIndustryRow {
            code: CompanyCode::new("apple"),
            name: "Apple Computer".to_string(),
            description: Some("Maker of OSX.".to_string()),
            industry: industry.map(str::to_string),
        }
    }

    #[test]
    fn empty_rows_assemble_to_nothing() {
        assert!(assemble_company(Vec::new(), Vec::new()).is_none());
    }

    #[test]
    fn company_without_industries_has_empty_list() {
        let detail = assemble_company(vec![row(None)], Vec::new()).unwrap();
        assert_eq!(detail.code.as_str(), "apple");
        assert!(detail.industries.is_empty());
        assert!(detail.invoices.is_empty());
    }

    #[test]
    fn industries_keep_row_order_without_dedup() {
        let rows = vec![row(Some("Technology")), row(Some("Retail")), row(Some("Technology"))];
        let detail = assemble_company(rows, Vec::new()).unwrap();
        assert_eq!(detail.industries, vec!["Technology", "Retail", "Technology"]);
    }

    #[test]
    fn serializes_with_nested_invoices() {
        let invoices = vec![InvoiceSummary {
            id: InvoiceId::new(7),
            amt: 100.0,
            paid: false,
        }];
        let detail = assemble_company(vec![row(Some("Technology"))], invoices).unwrap();
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["code"], "apple");
        assert_eq!(json["industries"][0], "Technology");
        assert_eq!(json["invoices"][0]["id"], 7);
        assert_eq!(json["invoices"][0]["paid"], false);
    }
}
