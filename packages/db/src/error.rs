//! Error taxonomy shared by every board operation.

use board_core::ErrorResponse;
use storage::StorageError;
use thiserror::Error;

/// Board errors.
///
/// Everything except `Storage`, `Hashing` and `InvalidConfig` is an expected
/// outcome the caller reports back to the user.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl BoardError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BoardError::NotFound(_) => "not_found",
            BoardError::Forbidden(_) => "forbidden",
            BoardError::Conflict(_) => "conflict",
            BoardError::Unauthenticated => "unauthenticated",
            BoardError::InvalidInput(_) => "invalid_input",
            BoardError::InvalidConfig(_) | BoardError::Storage(_) | BoardError::Hashing(_) => {
                "internal"
            }
        }
    }

    /// HTTP status the routing layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            BoardError::NotFound(_) => 404,
            BoardError::Forbidden(_) => 403,
            BoardError::Conflict(_) => 409,
            BoardError::Unauthenticated => 401,
            BoardError::InvalidInput(_) => 400,
            BoardError::InvalidConfig(_) | BoardError::Storage(_) | BoardError::Hashing(_) => 500,
        }
    }

    /// Error body for the routing layer. Internal details are not exposed.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self.kind() {
            "internal" => "internal server error".to_string(),
            _ => self.to_string(),
        };
        ErrorResponse::new(self.kind(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_transport_status() {
        assert_eq!(BoardError::NotFound("x".into()).status_code(), 404);
        assert_eq!(BoardError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(BoardError::Conflict("x".into()).status_code(), 409);
        assert_eq!(BoardError::Unauthenticated.status_code(), 401);
        assert_eq!(BoardError::InvalidInput("x".into()).status_code(), 400);
        let storage = BoardError::from(StorageError::InvalidConfig("x".into()));
        assert_eq!(storage.status_code(), 500);
    }

    #[test]
    fn internal_errors_are_redacted() {
        let err = BoardError::from(StorageError::InvalidConfig("/secret/path".into()));
        let body = err.to_response();
        assert_eq!(body.error, "internal");
        assert!(!body.message.contains("secret"));

        let body = BoardError::Conflict("This job is already being run".into()).to_response();
        assert_eq!(body.error, "conflict");
        assert!(body.message.contains("already being run"));
    }
}
