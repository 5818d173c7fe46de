use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage backends, independent of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or the call failed outright.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failing call.
        message: String,
        /// Backend-specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A create collided with a record that already exists.
    #[error("duplicate record `{key}`")]
    Conflict {
        /// The colliding key, e.g. a room number.
        key: String,
    },
}

impl StorageError {
    /// Wrap a backend failure as an unavailable error.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Build a conflict error for a duplicate record.
    pub fn conflict(key: impl Into<String>) -> Self {
        StorageError::Conflict { key: key.into() }
    }
}
