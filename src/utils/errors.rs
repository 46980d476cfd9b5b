//! Error handling for EventHub
//!
//! This module defines the main error types used throughout the application
//! and maps them onto HTTP responses at the handler boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::participation::ParticipationStatus;

/// One event that overlaps the event a user asked to join
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEntry {
    #[serde(rename = "eventId")]
    pub event_id: i64,
    pub title: String,
    pub time: String,
    pub role: ConflictRole,
}

/// Relationship of the user to a conflicting event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictRole {
    Participant,
    Organizer,
}

/// Main error type for EventHub application
#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Transaction aborted by a concurrent update, please retry")]
    TransactionConflict,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Event has reached maximum capacity")]
    Capacity,

    #[error("{reason}")]
    Duplicate {
        reason: String,
        status: ParticipationStatus,
        participation_id: i64,
    },

    #[error("You have scheduling conflicts with {} event(s)", conflicts.len())]
    SchedulingConflict { conflicts: Vec<ConflictEntry> },

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Image host error: {0}")]
    ImageHost(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl From<sqlx::Error> for EventHubError {
    fn from(err: sqlx::Error) -> Self {
        EventHubError::from_db(err)
    }
}

/// Result type alias for EventHub operations
pub type Result<T> = std::result::Result<T, EventHubError>;

impl EventHubError {
    /// Wrap a database error, recognising serialization failures and deadlocks
    pub fn from_db(err: sqlx::Error) -> Self {
        // 40001 serialization_failure, 40P01 deadlock_detected
        if let sqlx::Error::Database(ref db_err) = err {
            if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
                return EventHubError::TransactionConflict;
            }
        }
        EventHubError::Database(err)
    }

    pub fn not_found(resource: &'static str, id: i64) -> Self {
        EventHubError::NotFound { resource, id }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventHubError::Database(_) => false,
            EventHubError::Migration(_) => false,
            EventHubError::TransactionConflict => true,
            EventHubError::Config(_) => false,
            EventHubError::NotFound { .. } => false,
            EventHubError::Forbidden(_) => false,
            EventHubError::Unauthorized(_) => false,
            EventHubError::Validation(_) => false,
            EventHubError::InvalidState(_) => false,
            EventHubError::Capacity => false,
            EventHubError::Duplicate { .. } => false,
            EventHubError::SchedulingConflict { .. } => false,
            EventHubError::AlreadyExists(_) => false,
            EventHubError::RateLimitExceeded => true,
            EventHubError::ImageHost(_) => true,
            EventHubError::Http(_) => true,
            EventHubError::Serialization(_) => false,
            EventHubError::Io(_) => true,
            EventHubError::Jwt(_) => false,
            EventHubError::PasswordHash(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventHubError::Database(_) => ErrorSeverity::Critical,
            EventHubError::Migration(_) => ErrorSeverity::Critical,
            EventHubError::Config(_) => ErrorSeverity::Critical,
            EventHubError::Forbidden(_) => ErrorSeverity::Warning,
            EventHubError::Unauthorized(_) => ErrorSeverity::Warning,
            EventHubError::RateLimitExceeded => ErrorSeverity::Warning,
            EventHubError::TransactionConflict => ErrorSeverity::Warning,
            EventHubError::NotFound { .. }
            | EventHubError::Validation(_)
            | EventHubError::InvalidState(_)
            | EventHubError::Capacity
            | EventHubError::Duplicate { .. }
            | EventHubError::SchedulingConflict { .. }
            | EventHubError::AlreadyExists(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventHubError::NotFound { .. } => StatusCode::NOT_FOUND,
            EventHubError::Forbidden(_) => StatusCode::FORBIDDEN,
            EventHubError::Unauthorized(_) | EventHubError::Jwt(_) => StatusCode::UNAUTHORIZED,
            EventHubError::Validation(_)
            | EventHubError::InvalidState(_)
            | EventHubError::Capacity
            | EventHubError::Duplicate { .. }
            | EventHubError::SchedulingConflict { .. } => StatusCode::BAD_REQUEST,
            EventHubError::AlreadyExists(_) | EventHubError::TransactionConflict => StatusCode::CONFLICT,
            EventHubError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            EventHubError::ImageHost(_) | EventHubError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            EventHubError::NotFound { .. } => "NOT_FOUND",
            EventHubError::Forbidden(_) => "FORBIDDEN",
            EventHubError::Unauthorized(_) | EventHubError::Jwt(_) => "UNAUTHORIZED",
            EventHubError::Validation(_) => "VALIDATION_ERROR",
            EventHubError::InvalidState(_) => "INVALID_STATE",
            EventHubError::Capacity => "CAPACITY_EXCEEDED",
            EventHubError::Duplicate { .. } => "DUPLICATE_PARTICIPATION",
            EventHubError::SchedulingConflict { .. } => "SCHEDULING_CONFLICT",
            EventHubError::AlreadyExists(_) => "ALREADY_EXISTS",
            EventHubError::TransactionConflict => "TRANSACTION_CONFLICT",
            EventHubError::RateLimitExceeded => "RATE_LIMITED",
            EventHubError::ImageHost(_) | EventHubError::Http(_) => "UPSTREAM_ERROR",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Error response body (JSON)
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicts: Option<Vec<ConflictEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ParticipationStatus>,
    #[serde(rename = "participationId", skip_serializing_if = "Option::is_none")]
    participation_id: Option<i64>,
}

impl IntoResponse for EventHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details never leave the process
        let message = if status.is_server_error() {
            tracing::error!(
                status = %status,
                code = self.code(),
                severity = %self.severity(),
                error = %self,
                "Request failed"
            );
            match status {
                StatusCode::BAD_GATEWAY => "Upstream service failed".to_string(),
                _ => "An internal error occurred".to_string(),
            }
        } else {
            self.to_string()
        };

        let mut body = ErrorBody {
            error: message,
            code: self.code(),
            conflicts: None,
            status: None,
            participation_id: None,
        };

        match self {
            EventHubError::SchedulingConflict { conflicts } => body.conflicts = Some(conflicts),
            EventHubError::Duplicate { status, participation_id, .. } => {
                body.status = Some(status);
                body.participation_id = Some(participation_id);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
