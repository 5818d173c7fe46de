use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::storage::StorageError, room::roster::SeatNotFound, state::session::InvalidTransition};

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A storage call failed.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// No storage backend is installed (degraded mode).
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// A storage call exceeded its configured time bound.
    #[error("storage call timed out")]
    Timeout,
    /// No room exists under the given number.
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// Sit-in was requested for a seat with no cards waiting.
    #[error(transparent)]
    SeatNotFound(#[from] SeatNotFound),
    /// A new room's number collides with an existing one.
    #[error("room number `{0}` is already taken")]
    RoomNumberTaken(String),
    /// Inbound payload is missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Event arrived in a connection phase that cannot accept it.
    #[error("invalid session state: {0}")]
    Session(#[from] InvalidTransition),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { key } => ServiceError::RoomNumberTaken(key),
            other => ServiceError::Unavailable(other),
        }
    }
}

/// Application-level errors converted into HTTP responses.
///
/// The legacy room endpoints deliberately bypass this type and answer 200
/// with an in-band failure string; `AppError` covers the rest of the
/// surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Timeout => AppError::ServiceUnavailable("storage call timed out".into()),
            ServiceError::RoomNotFound(number) => {
                AppError::NotFound(format!("room `{number}` not found"))
            }
            ServiceError::SeatNotFound(source) => AppError::NotFound(source.to_string()),
            ServiceError::RoomNumberTaken(message) => AppError::Conflict(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Session(source) => AppError::Conflict(source.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_conflict_names_the_room_number_once() {
        let err: ServiceError = StorageError::conflict("4821").into();
        assert!(matches!(&err, ServiceError::RoomNumberTaken(number) if number == "4821"));
        assert_eq!(err.to_string(), "room number `4821` is already taken");
    }

    #[test]
    fn other_storage_failures_map_to_unavailable() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ServiceError = StorageError::unavailable("ping", source).into();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
