use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use biztime_core::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, err.to_string()),
        LedgerError::Conflict(_) => json_error(StatusCode::CONFLICT, err.to_string()),
        LedgerError::Validation(_) => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        LedgerError::Store(_) => {
            tracing::error!(error = %err, "ledger store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": {
                "message": message.into(),
                "status": status.as_u16(),
            }
        })),
    )
        .into_response()
}
