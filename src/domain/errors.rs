//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The exception handler chain turns them into HTTP responses.

use thiserror::Error;

use super::validation::ValidationErrors;

/// Failures surfaced by the generic repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested record is absent
    #[error("{entity} not found")]
    NotFound { entity: String },
    /// Field-level violations reported by the bound validator
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    /// Foreign-key conflict while deleting
    #[error("cannot delete {entity}: related records reference it")]
    ConstraintViolation { entity: String },
    /// Any other persistence failure, with the driver message
    #[error("{0}")]
    Storage(String),
    /// Delete ran but removed nothing
    #[error("delete failed, confirm the record exists")]
    DeleteFailed,
    /// Misconfigured repository, validator or environment
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RepositoryError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity: entity.into(),
        }
    }

    /// Numeric code reported alongside the message.
    pub fn code(&self) -> i64 {
        match self {
            RepositoryError::NotFound { .. } => 404,
            RepositoryError::Validation(_) => 422,
            RepositoryError::ConstraintViolation { .. } => 409,
            RepositoryError::DeleteFailed => 400,
            RepositoryError::Storage(_) | RepositoryError::Configuration(_) => 500,
        }
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for RepositoryError {
    fn from(e: sea_orm::DbErr) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

/// Kind of spreadsheet failure, when the producer can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetErrorKind {
    /// A cell formula could not be evaluated
    Formula,
    /// The writer cannot produce the requested legacy format
    WriterCompatibility,
    /// Anything else; classified by message
    Other,
}

/// Error raised while reading or writing spreadsheets.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SpreadsheetError {
    pub kind: SpreadsheetErrorKind,
    pub message: String,
}

impl SpreadsheetError {
    pub fn new(kind: SpreadsheetErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Failed call to a sibling service.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RpcError {
    pub message: String,
    pub code: i64,
}

impl RpcError {
    pub const DEFAULT_CODE: i64 = 511;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Self::DEFAULT_CODE,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }
}
