//! Service-level errors and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use intranet_core::CoreError;
use intranet_storage::{ErrorCategory, StorageError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A read could not be served from cache or backend.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(e) => match e.category() {
                ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                ErrorCategory::Validation => StatusCode::BAD_REQUEST,
                ErrorCategory::Infrastructure => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "not-found",
            StatusCode::BAD_REQUEST => "invalid",
            StatusCode::SERVICE_UNAVAILABLE => "unavailable",
            _ => "exception",
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(e: CoreError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
