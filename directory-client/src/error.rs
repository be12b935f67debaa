//! Client-side error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for directory calls.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Why a directory call failed.
///
/// `Transport` means the request never got an answer; the other variants are
/// answers from the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backend could not be reached (connect, timeout, broken body).
    #[error("directory unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// A required field is missing or malformed.
    #[error("invalid connection record: {0}")]
    Validation(String),

    /// An equivalent record already exists.
    #[error("conflicting connection record: {0}")]
    Conflict(String),

    /// No record with that id.
    #[error("connection record not found: {0}")]
    NotFound(String),

    /// A gateway in front of the directory answered, but could not reach it
    /// (502, 503, 504).
    #[error("directory unreachable through gateway ({status}): {message}")]
    Unreachable { status: StatusCode, message: String },

    /// Any other non-success answer.
    #[error("directory returned {status}: {message}")]
    Backend { status: StatusCode, message: String },

    /// A success answer whose body could not be read as expected.
    #[error("unexpected directory response: {0}")]
    Decode(String),
}

impl DirectoryError {
    /// Maps a non-success status and its (already extracted) message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                DirectoryError::Validation(message)
            }
            StatusCode::NOT_FOUND => DirectoryError::NotFound(message),
            StatusCode::CONFLICT => DirectoryError::Conflict(message),
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => DirectoryError::Unreachable { status, message },
            _ => DirectoryError::Backend { status, message },
        }
    }

    /// True when the request did not reach the directory, either directly or
    /// behind a gateway.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DirectoryError::Transport(_) | DirectoryError::Unreachable { .. }
        )
    }
}

/// Errors raised by the selection form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("column {column} does not belong to table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("no table selected")]
    NoTableSelected,

    #[error("invalid selection catalog: {0}")]
    Catalog(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            DirectoryError::from_status(StatusCode::BAD_REQUEST, "x".into()),
            DirectoryError::Validation(_)
        ));
        assert!(matches!(
            DirectoryError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "x".into()),
            DirectoryError::Validation(_)
        ));
        assert!(matches!(
            DirectoryError::from_status(StatusCode::NOT_FOUND, "x".into()),
            DirectoryError::NotFound(_)
        ));
        assert!(matches!(
            DirectoryError::from_status(StatusCode::CONFLICT, "x".into()),
            DirectoryError::Conflict(_)
        ));
        assert!(matches!(
            DirectoryError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "x".into()),
            DirectoryError::Backend { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn test_gateway_failures_count_as_transport() {
        for status in [
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            let err = DirectoryError::from_status(status, "x".into());
            assert!(matches!(err, DirectoryError::Unreachable { .. }), "{err:?}");
            assert!(err.is_transport());
        }
        assert!(!DirectoryError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "x".into()).is_transport());
        assert!(!DirectoryError::NotFound("x".into()).is_transport());
    }
}
