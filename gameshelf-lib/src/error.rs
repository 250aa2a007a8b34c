use gameshelf_catalog::FieldError;
use gameshelf_db::{OperationError, SchemaError};
use gameshelf_import::SeedError;
use thiserror::Error;

use crate::settings::SettingsError;

/// Faults below the form layer. Never caused by bad user input.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

impl From<rusqlite::Error> for ShelfError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.into())
    }
}

/// Outcome of a failed form submission.
#[derive(Debug, Error)]
pub enum SubmitError<F> {
    /// The input was refused. `form` is handed back so it can be shown
    /// again with `error` next to the offending field.
    #[error("{error}")]
    Rejected { form: F, error: FieldError },

    #[error(transparent)]
    Storage(#[from] ShelfError),
}

impl<F> SubmitError<F> {
    pub fn rejected(form: F, error: FieldError) -> Self {
        Self::Rejected { form, error }
    }

    pub fn storage(e: impl Into<ShelfError>) -> Self {
        Self::Storage(e.into())
    }

    /// The validation error, if the submission was rejected.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            Self::Rejected { error, .. } => Some(error),
            Self::Storage(_) => None,
        }
    }

    /// The submitted form, if the submission was rejected.
    pub fn into_form(self) -> Option<F> {
        match self {
            Self::Rejected { form, .. } => Some(form),
            Self::Storage(_) => None,
        }
    }
}
