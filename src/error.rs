//! Error types for the attendance kiosk.
//!
//! Every variant maps onto an HTTP status through [`ResponseError`]; none of
//! them is fatal to the process.

use std::path::PathBuf;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Why a check-in or check-out was refused for the record's current status.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransitionError {
    #[error("You haven't checked in yet!")]
    NotCheckedIn,
    #[error("You are already checked in!")]
    AlreadyCheckedIn,
    #[error("You have already checked out!")]
    AlreadyCheckedOut,
}

#[derive(Error, Debug)]
pub enum AttendanceError {
    /// Blank surname or name initial.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// Backing file unreadable.
    #[error("failed to read attendance data from {path}: {source}")]
    PersistenceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file could not be replaced.
    #[error("failed to write attendance data to {path}: {source}")]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request payload has the wrong shape.
    #[error("{0}")]
    MalformedRequest(String),
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

impl AttendanceError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest(message.into())
    }

    /// Save failures are worth retrying from the client.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceWrite { .. })
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::PersistenceRead { .. } | Self::PersistenceWrite { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::PersistenceRead { .. } => "Failed to read attendance data".to_string(),
            Self::PersistenceWrite { .. } => format!("Failed to update attendance data: {self}"),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
