use axum::Router;

pub mod companies;
pub mod industries;
pub mod invoices;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/companies", companies::router())
        .nest("/invoices", invoices::router())
        .nest("/industries", industries::router())
}
