// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::AssignmentError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Well-formed request that conflicts with stored data; nothing was written.
    #[error("Unprocessable request: {message}")]
    Unprocessable {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::Empty | AssignmentError::TooLarge { .. } => {
                AppError::BadRequest(err.to_string())
            }
            AssignmentError::Rejected { ref failures } => AppError::Unprocessable {
                message: err.to_string(),
                details: serde_json::to_value(failures).ok(),
            },
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details): (StatusCode, &str, Option<serde_json::Value>) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.into())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", Some(msg.into())),
            AppError::Unprocessable { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable",
                Some(details.unwrap_or_else(|| message.into())),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
