use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use biztime_core::CompanyCode;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/:code",
            get(get_company).put(update_company).delete(delete_company),
        )
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger().list_companies().await {
        Ok(companies) => Json(json!({ "companies": companies })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = CompanyCode::new(code);

    match services.ledger().company_detail(&code).await {
        Ok(company) => Json(json!({ "company": company })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateCompanyRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let new = match body.into_new_company() {
        Ok(new) => new,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger().create_company(new).await {
        Ok(company) => (StatusCode::CREATED, Json(json!({ "company": company }))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
    payload: Result<Json<dto::UpdateCompanyRequest>, JsonRejection>,
) -> axum::response::Response {
    let code = CompanyCode::new(code);
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let update = match body.into_update() {
        Ok(update) => update,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger().update_company(&code, update).await {
        Ok(company) => Json(json!({ "company": company })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = CompanyCode::new(code);

    match services.ledger().delete_company(&code).await {
        Ok(()) => Json(json!({ "status": "deleted" })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
