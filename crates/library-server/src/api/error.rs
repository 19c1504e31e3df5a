//! JSON error responses.

use crate::service::ServiceError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Upstream(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ServiceError::Validation(details) => json!({
                "success": false,
                "error": "Validation error",
                "details": details,
            }),
            ServiceError::Upstream(e) => {
                tracing::warn!(operation = e.operation(), error = %e, "Catalog request failed");
                json!({
                    "success": false,
                    "error": "Failed to reach manga catalog",
                    "details": e.to_string(),
                })
            }
            ServiceError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                json!({
                    "success": false,
                    "error": "Internal server error",
                })
            }
            other => json!({
                "success": false,
                "error": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::InvalidInput(format!("Invalid query string: {}", rejection.body_text()))
    }
}
