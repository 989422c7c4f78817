use crate::model::{EntityKind, Id};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PracticeError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Id },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Referenced {kind} does not exist: {id}")]
    ReferenceNotFound { kind: EntityKind, id: Id },

    #[error("Outside business hours: {0}")]
    OutOfBusinessHours(String),

    #[error("Physician {physician_id} is already booked (conflicts with appointment {conflicting_id})")]
    DoubleBooked { physician_id: Id, conflicting_id: Id },

    #[error("License number already in use: {0}")]
    DuplicateLicense(String),

    /// A remote server refused the request.
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Flat classification of [`PracticeError`], shared by the REST layer and the
/// remote client so both ends agree on what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    ReferenceNotFound,
    OutOfBusinessHours,
    DoubleBooked,
    DuplicateLicense,
    Storage,
}

impl PracticeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PracticeError::NotFound { .. } => ErrorKind::NotFound,
            PracticeError::ValidationFailed(_) | PracticeError::Config(_) => {
                ErrorKind::ValidationFailed
            }
            PracticeError::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            PracticeError::OutOfBusinessHours(_) => ErrorKind::OutOfBusinessHours,
            PracticeError::DoubleBooked { .. } => ErrorKind::DoubleBooked,
            PracticeError::DuplicateLicense(_) => ErrorKind::DuplicateLicense,
            PracticeError::Rejected { kind, .. } => *kind,
            PracticeError::Io(_) | PracticeError::Serialization(_) | PracticeError::Store(_) => {
                ErrorKind::Storage
            }
        }
    }
}

/// JSON body of every REST error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

impl From<&PracticeError> for ErrorBody {
    fn from(err: &PracticeError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ErrorBody> for PracticeError {
    fn from(body: ErrorBody) -> Self {
        PracticeError::Rejected {
            kind: body.error,
            message: body.message,
        }
    }
}

pub type Result<T> = std::result::Result<T, PracticeError>;
