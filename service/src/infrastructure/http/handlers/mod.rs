use axum::http::StatusCode;

pub mod context;
pub mod suggest;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
