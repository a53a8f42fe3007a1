//! Domain errors shared by the catalog, account, lending and assistant services.

use libris_db::StoreError;
use libris_http::AppError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("'{title}' has no copies left to borrow")]
    Unavailable { book_id: i64, title: String },

    #[error("book {book_id} is not in your borrowed list")]
    NotBorrowed { book_id: i64 },

    #[error("'{title}' is already on loan to you")]
    AlreadyBorrowed { book_id: i64, title: String },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LibraryError {
    pub fn book_not_found(id: i64) -> Self {
        Self::NotFound { entity: "book", id }
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound { entity: "user", id }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        let message = err.to_string();
        match err {
            LibraryError::NotFound { .. } => AppError::not_found(message),
            LibraryError::Unavailable { .. } => AppError::conflict("unavailable", message),
            LibraryError::NotBorrowed { .. } => AppError::conflict("not_borrowed", message),
            LibraryError::AlreadyBorrowed { .. } => AppError::conflict("already_borrowed", message),
            LibraryError::DuplicateEmail(_) => AppError::conflict("duplicate_email", message),
            LibraryError::InvalidInput { field, reason } => {
                AppError::validation(vec![json!({"field": field, "error": reason})], message)
            }
            LibraryError::Store(err) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}
