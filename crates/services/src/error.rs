//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{PreferencesError, QuestionError};
use quiz_core::session::SessionInvariantError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no preferences saved for {user}; complete onboarding first")]
    MissingPreferences { user: String },
    #[error(transparent)]
    Invariant(#[from] SessionInvariantError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}
