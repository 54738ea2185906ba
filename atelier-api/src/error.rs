use atelier_catalog::PriceListError;
use atelier_core::gateway::GatewayError;
use atelier_order::feedback::FeedbackError;
use atelier_order::ingest::IngestError;
use atelier_order::lifecycle::OrderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    SignatureError(String),
    NotFoundError(String),
    ConflictError(String),
    UnprocessableError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Map a boxed repository error back onto a typed response. Domain
    /// errors cross the repository boundary as trait objects; everything
    /// unrecognized is a 500 so the gateway/client retries.
    pub fn from_repo(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        if let Some(e) = err.downcast_ref::<OrderError>() {
            return match e {
                OrderError::NotFound(_) => AppError::NotFoundError(e.to_string()),
                OrderError::InvalidTransition { .. } => AppError::UnprocessableError(e.to_string()),
                OrderError::AccessDenied(_) => AppError::AuthorizationError(e.to_string()),
            };
        }
        if let Some(e) = err.downcast_ref::<FeedbackError>() {
            return match e {
                FeedbackError::DuplicateRating(_) | FeedbackError::AlreadyClosed(_) => {
                    AppError::ConflictError(e.to_string())
                }
                _ => AppError::ValidationError(e.to_string()),
            };
        }
        if let Some(e) = err.downcast_ref::<PriceListError>() {
            return match e {
                PriceListError::NotFound(_) => AppError::NotFoundError(e.to_string()),
                _ => AppError::ValidationError(e.to_string()),
            };
        }
        if let Some(e) = err.downcast_ref::<IngestError>() {
            return AppError::ValidationError(e.to_string());
        }
        if let Some(e) = err.downcast_ref::<GatewayError>() {
            return AppError::ValidationError(e.to_string());
        }
        AppError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::SignatureError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
