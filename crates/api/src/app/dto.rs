use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use biztime_companies::{CompanyUpdate, NewCompany, NewIndustry};
use biztime_core::{CompanyCode, LedgerError, LedgerResult};
use biztime_invoicing::{InvoiceUpdate, NewInvoice};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------
//
// Fields are optional at the wire level so a missing field becomes a
// validation error in the envelope rather than an extractor rejection.

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreateCompanyRequest {
    pub fn into_new_company(self) -> LedgerResult<NewCompany> {
        Ok(NewCompany {
            code: self.code,
            name: required(self.name, "name")?,
            description: self.description,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateCompanyRequest {
    pub fn into_update(self) -> LedgerResult<CompanyUpdate> {
        CompanyUpdate::new(required(self.name, "name")?, self.description)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub comp_code: Option<String>,
    pub amt: Option<f64>,
}

impl CreateInvoiceRequest {
    pub fn into_new_invoice(self) -> LedgerResult<NewInvoice> {
        NewInvoice::from_parts(self.comp_code.as_deref(), self.amt)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub amt: Option<f64>,
    pub paid: Option<bool>,
}

impl UpdateInvoiceRequest {
    pub fn into_update(self) -> LedgerResult<InvoiceUpdate> {
        InvoiceUpdate::new(required(self.amt, "amt")?, required(self.paid, "paid")?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIndustryRequest {
    pub code: Option<String>,
    pub industry: Option<String>,
}

impl CreateIndustryRequest {
    pub fn into_new_industry(self) -> LedgerResult<NewIndustry> {
        Ok(NewIndustry::new(
            required(self.code, "code")?,
            required(self.industry, "industry")?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct AssociateCompanyRequest {
    pub comp_code: Option<String>,
}

impl AssociateCompanyRequest {
    pub fn into_company_code(self) -> LedgerResult<CompanyCode> {
        CompanyCode::parse(&required(self.comp_code, "comp_code")?)
    }
}

fn required<T>(value: Option<T>, field: &str) -> LedgerResult<T> {
    value.ok_or_else(|| LedgerError::validation(format!("{field} is required")))
}

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, turning malformed payloads into a 400 envelope.
pub fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, axum::response::Response> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            format!("invalid JSON body: {}", rejection.body_text()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_company_name_is_a_validation_error() {
        let req: CreateCompanyRequest = serde_json::from_str(r#"{"code":"apple"}"#).unwrap();
        let err = req.into_new_company().unwrap_err();
        assert_eq!(err, LedgerError::validation("name is required"));
    }

    #[test]
    fn invoice_update_requires_amt_and_paid() {
        let req: UpdateInvoiceRequest = serde_json::from_str(r#"{"amt":10}"#).unwrap();
        assert_eq!(
            req.into_update().unwrap_err(),
            LedgerError::validation("paid is required")
        );

        let req: UpdateInvoiceRequest =
            serde_json::from_str(r#"{"amt":10,"paid":null}"#).unwrap();
        assert!(req.into_update().is_err());

        let req: UpdateInvoiceRequest = serde_json::from_str(r#"{"paid":true}"#).unwrap();
        assert_eq!(
            req.into_update().unwrap_err(),
            LedgerError::validation("amt is required")
        );

        let req: UpdateInvoiceRequest =
            serde_json::from_str(r#"{"amt":10,"paid":false}"#).unwrap();
        let update = req.into_update().unwrap();
        assert!(!update.paid);
        assert_eq!(update.amt, 10.0);
    }

    #[test]
    fn association_requires_comp_code() {
        let req: AssociateCompanyRequest = serde_json::from_str("{}").unwrap();
        assert!(req.into_company_code().is_err());

        let req: AssociateCompanyRequest =
            serde_json::from_str(r#"{"comp_code":"apple"}"#).unwrap();
        assert_eq!(req.into_company_code().unwrap().as_str(), "apple");
    }
}
