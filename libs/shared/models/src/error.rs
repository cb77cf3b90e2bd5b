use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Error returned by every HTTP handler. `kind` is a stable code clients branch on.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {message}")]
    NotFound { kind: &'static str, message: String },

    #[error("Bad Request: {message}")]
    BadRequest { kind: &'static str, message: String },

    #[error("Unprocessable: {message}")]
    Unprocessable { kind: &'static str, message: String },

    #[error("Conflict: {message}")]
    Conflict {
        kind: &'static str,
        message: String,
        conflicting_ids: Vec<Uuid>,
    },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound { kind, .. }
            | AppError::BadRequest { kind, .. }
            | AppError::Unprocessable { kind, .. }
            | AppError::Conflict { kind, .. } => *kind,
            AppError::Unavailable(_) => "unavailable",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let body = match &self {
            AppError::Conflict {
                message,
                conflicting_ids,
                ..
            } => json!({
                "error": message,
                "kind": kind,
                "conflicting_ids": conflicting_ids,
            }),
            AppError::NotFound { message, .. }
            | AppError::BadRequest { message, .. }
            | AppError::Unprocessable { message, .. } => json!({
                "error": message,
                "kind": kind,
            }),
            AppError::Unavailable(message) | AppError::Internal(message) => json!({
                "error": message,
                "kind": kind,
            }),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, self);
        } else {
            tracing::debug!("Request rejected: {}: {}", status, self);
        }

        (status, Json(body)).into_response()
    }
}
