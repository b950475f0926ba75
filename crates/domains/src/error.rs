//! # AppError
//!
//! Centralized error handling for the board.
//! Maps domain-specific failures to actionable error types.
//!
//! A wrong delete password is deliberately absent here: it is an expected
//! outcome, reported through [`crate::Outcome::IncorrectSecret`].

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all board operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Thread, Reply)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Missing or empty required input
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The document changed underneath a read-modify-write
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, pool exhausted)
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl AppError {
    pub fn thread_not_found(id: Uuid) -> Self {
        Self::NotFound("thread", id.to_string())
    }

    pub fn reply_not_found(id: Uuid) -> Self {
        Self::NotFound("reply", id.to_string())
    }
}

/// Failures reported by a [`crate::ThreadRepository`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A whole-document update carried a stale revision
    #[error("thread {0} was modified concurrently")]
    Conflict(Uuid),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(id) => {
                AppError::Conflict(format!("thread {id} was modified concurrently, retry"))
            }
            StoreError::Backend(source) => AppError::StoreUnavailable(source),
        }
    }
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_app_errors() {
        let id = Uuid::now_v7();
        assert!(matches!(
            AppError::from(StoreError::Conflict(id)),
            AppError::Conflict(_)
        ));
        let backend = StoreError::from(anyhow::anyhow!("connection refused"));
        match AppError::from(backend) {
            AppError::StoreUnavailable(source) => {
                assert_eq!(source.to_string(), "connection refused")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn not_found_names_entity() {
        let id = Uuid::nil();
        assert_eq!(
            AppError::reply_not_found(id).to_string(),
            format!("reply not found with ID {id}")
        );
    }
}
