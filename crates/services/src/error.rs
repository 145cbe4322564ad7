//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuizSettingsError, RoundConfigError, RoundSummaryError};
use storage::catalog::CatalogError;
use storage::repository::StorageError;

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("not enough items: {available} available, {required} required")]
    InsufficientItems { available: usize, required: usize },
    #[error("no active round")]
    NoActiveRound,
    #[error("invalid round configuration: {0}")]
    InvalidConfiguration(#[from] RoundConfigError),
    #[error(transparent)]
    Summary(#[from] RoundSummaryError),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while starting a round from stored settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizLoopError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
