use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use biztime_core::IndustryCode;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_industries).post(create_industry))
        .route("/:code/companies", post(associate_company))
}

pub async fn list_industries(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger().list_industries().await {
        Ok(industries) => Json(json!({ "industries": industries })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_industry(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateIndustryRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let new = match body.into_new_industry() {
        Ok(new) => new,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger().create_industry(new).await {
        Ok(industry) => (StatusCode::CREATED, Json(json!({ "industry": industry }))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// File a company under an industry.
pub async fn associate_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
    payload: Result<Json<dto::AssociateCompanyRequest>, JsonRejection>,
) -> axum::response::Response {
    let industry_code = IndustryCode::new(code);
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let company_code = match body.into_company_code() {
        Ok(code) => code,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services
        .ledger()
        .associate_industry(&industry_code, &company_code)
        .await
    {
        Ok(association) => {
            (StatusCode::CREATED, Json(json!({ "association": association }))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
