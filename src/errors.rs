// ABOUTME: Application error taxonomy shared across routes, services, and adapters
// ABOUTME: Maps every error variant onto the HTTP status and JSON body the client expects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Error handling for the Flow Catalyst server
//!
//! All fallible code in the crate returns [`AppResult`]. Error variants carry
//! enough context to produce the `{error, details?, hint?}` JSON bodies the
//! mobile client renders. Provider and persistence failures are special: the
//! run orchestrator absorbs them into response content instead of letting
//! them propagate (see `routes::runs`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP mappings
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid server configuration (fatal, 500)
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication missing, expired, or unverifiable (401)
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// Referenced resource does not exist or is not visible to the caller (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request body or parameters (400)
    #[error("validation error: {0}")]
    Validation(String),

    /// Free-tier daily run quota exhausted (429)
    #[error("daily limit of {limit} runs reached")]
    DailyLimitReached {
        /// The configured daily limit, included in the client-facing message
        limit: u32,
    },

    /// Upstream LLM provider returned a non-success response
    ///
    /// Never surfaced as a transport error on the run path; the orchestrator
    /// converts it into output text.
    #[error("provider error (HTTP {status}): {message}")]
    UpstreamProvider {
        /// HTTP status returned by the provider
        status: u16,
        /// Parsed provider error message, or the raw body when unparseable
        message: String,
    },

    /// Database operation failed (500)
    #[error("database error: {0}")]
    Database(String),

    /// Unexpected internal failure (500)
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Missing or invalid server configuration
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Authentication failure
    pub fn auth_required(msg: impl Into<String>) -> Self {
        Self::AuthRequired(msg.into())
    }

    /// Resource not found or not visible
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Malformed request
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Database failure
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Unexpected internal failure
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DailyLimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamProvider { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// JSON error body shape shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Short, stable error description
    pub error: String,
    /// Additional context, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Actionable suggestion for the caller, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Config(msg) => ErrorBody {
                error: "Server misconfiguration".into(),
                details: Some(msg.clone()),
                hint: None,
            },
            AppError::AuthRequired(msg) => ErrorBody {
                error: "Authentication required".into(),
                details: Some(msg.clone()),
                hint: Some("Provide a valid Authorization: Bearer token".into()),
            },
            AppError::NotFound(msg) => ErrorBody {
                error: msg.clone(),
                details: None,
                hint: None,
            },
            AppError::Validation(msg) => ErrorBody {
                error: msg.clone(),
                details: None,
                hint: None,
            },
            AppError::DailyLimitReached { limit } => ErrorBody {
                error: format!("Daily limit of {limit} runs reached"),
                details: None,
                hint: Some("Upgrade to Pro for unlimited runs".into()),
            },
            AppError::UpstreamProvider { status, message } => ErrorBody {
                error: format!("AI provider request failed (HTTP {status})"),
                details: Some(message.clone()),
                hint: None,
            },
            AppError::Database(msg) | AppError::Internal(msg) => ErrorBody {
                error: "Internal server error".into(),
                details: Some(msg.clone()),
                hint: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::config("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::auth_required("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DailyLimitReached { limit: 3 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn daily_limit_message_carries_limit() {
        let err = AppError::DailyLimitReached { limit: 5 };
        assert!(err.to_string().contains('5'));
    }
}
