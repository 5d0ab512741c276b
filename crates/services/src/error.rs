//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::InvalidIdError;
use quiz_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `ContentService`.
///
/// These surface to the presenter as a recoverable load state with a retry
/// action; they are never session-engine errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionRunError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("session is not finished")]
    NotFinished,
}

/// Errors emitted by `ImportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("invalid bundle json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Id(#[from] InvalidIdError),
    #[error(transparent)]
    Invalid(#[from] quiz_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
