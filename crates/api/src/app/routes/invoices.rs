use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use biztime_core::InvoiceId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

fn parse_id(raw: &str) -> Result<InvoiceId, axum::response::Response> {
    raw.parse::<InvoiceId>()
        .map_err(errors::ledger_error_to_response)
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger().list_invoices().await {
        Ok(invoices) => Json(json!({ "invoices": invoices })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.ledger().invoice_detail(id).await {
        Ok(invoice) => Json(json!({ "invoice": invoice })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateInvoiceRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let new = match body.into_new_invoice() {
        Ok(new) => new,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger().create_invoice(new).await {
        Ok(invoice) => (StatusCode::CREATED, Json(json!({ "invoice": invoice }))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateInvoiceRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let update = match body.into_update() {
        Ok(update) => update,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger().update_invoice(id, update).await {
        Ok(invoice) => Json(json!({ "invoice": invoice })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.ledger().delete_invoice(id).await {
        Ok(()) => Json(json!({ "status": "deleted" })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
