//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{CatalogError, QuestionError, SessionStateError, SummaryError};
use storage::repository::StorageError;

/// Errors emitted by the quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("song catalog has no tracks")]
    EmptyCatalog,

    #[error("catalog has only {available} distinct tracks, {required} options required")]
    InsufficientOptions { available: usize, required: usize },

    #[error("saved game does not match the current catalog")]
    StaleSave,

    #[error("operation is not valid in the current phase")]
    Phase,

    #[error(transparent)]
    State(#[from] SessionStateError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogFetchError {
    #[error("invalid catalog base URL")]
    InvalidBaseUrl,

    #[error("catalog returned no playable tracks")]
    EmptyResponse,

    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("catalog payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
