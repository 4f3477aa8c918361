//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidInput`] thrown when a request is malformed (bad month, bad amount).
//! - [`InvalidField`] thrown when a single field is rejected (duplicate phone number).
//! - [`InvalidState`] thrown when a workflow action is attempted from the wrong status.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`Forbidden`] thrown when the actor's role does not allow the action.
//!
//! None of them leave partial writes behind: they are raised either before
//! any mutation or inside a DB transaction that is then dropped.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("{0}")]
    InvalidState(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (
                Self::InvalidField {
                    field: fa,
                    message: ma,
                },
                Self::InvalidField {
                    field: fb,
                    message: mb,
                },
            ) => fa == fb && ma == mb,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
