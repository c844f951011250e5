//! Errors returned by the feedback API.
//!
//! Handlers return `Result<T, ApiError>`; [`ApiError`] renders itself as a
//! JSON body of the form `{"error": "..."}`. Store failures are logged in full
//! but the caller only ever sees a fixed message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::widget::RegistryError;

/// The caller sent something we won't accept.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Message is required")]
    MissingMessage,

    #[error("Invalid JSON body")]
    MalformedBody(String),
}

/// The store was unavailable or refused the operation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to save feedback")]
    Save(anyhow::Error),

    #[error("Failed to fetch feedbacks")]
    Fetch(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Widget is not available")]
    Widget(#[from] RegistryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) | ApiError::Widget(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(ValidationError::MalformedBody(detail)) => {
                tracing::debug!(detail = %detail, "rejected malformed request body");
            }
            ApiError::Validation(e) => {
                tracing::debug!(error = %e, "rejected feedback payload");
            }
            ApiError::Persistence(PersistenceError::Save(e)) => {
                tracing::error!(error = ?e, "failed to save feedback");
            }
            ApiError::Persistence(PersistenceError::Fetch(e)) => {
                tracing::error!(error = ?e, "failed to fetch feedback");
            }
            ApiError::Widget(e) => {
                tracing::error!(error = %e, "failed to mount widget");
            }
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
