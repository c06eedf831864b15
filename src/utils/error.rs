use std::result;

use thiserror::Error;

/// A type alias for handling errors related to batmon.
pub type Result<T> = result::Result<T, BatmonError>;

/// An error that can occur while batmon runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatmonError {
    /// An error when there is an IO exception.
    #[error("IO exception, {0}")]
    InvalidIo(String),
    /// A collaborator refused a property, signal, or indicator request.
    #[error("Publish error, {0}")]
    Publish(String),
    /// An error to represent generic errors.
    #[error("Error, {0}")]
    GenericError(String),
}

impl From<std::io::Error> for BatmonError {
    fn from(err: std::io::Error) -> Self {
        BatmonError::InvalidIo(err.to_string())
    }
}
