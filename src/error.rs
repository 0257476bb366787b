// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Season;

/// Errors raised by the scoring core.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// Activity reported for a day before the last recorded one.
    #[error("Activity date {attempted} precedes last activity date {last}")]
    InvalidActivityDate {
        last: NaiveDate,
        attempted: NaiveDate,
    },

    #[error("Unknown achievement: {0}")]
    UnknownAchievement(String),

    #[error("Unknown badge: {0}")]
    UnknownBadge(String),

    #[error("Badge is not currently available: {0}")]
    BadgeUnavailable(String),

    /// A write aimed at one season touched rows of another.
    #[error("Season mismatch: expected {expected}, found {found}")]
    SeasonMismatch { expected: Season, found: Season },

    /// New ranks could not be committed; the previous ranks are intact.
    #[error("Failed to commit ranks for season {season}: {reason}")]
    RankRecomputeFailure { season: Season, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidActivityDate { .. } => AppError::BadRequest(err.to_string()),
            ScoringError::UnknownAchievement(_) | ScoringError::UnknownBadge(_) => {
                AppError::NotFound(err.to_string())
            }
            ScoringError::BadgeUnavailable(_) => AppError::Conflict(err.to_string()),
            ScoringError::Storage(msg) => AppError::Database(msg),
            ScoringError::SeasonMismatch { .. } | ScoringError::RankRecomputeFailure { .. } => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
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
