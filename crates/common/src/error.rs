//! Error types for coterie.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Variants map one-to-one onto the error surface an outer transport layer
/// (HTTP or otherwise) presents to callers. Duplicate-key conflicts on
/// unique pairs are intentionally absent: repositories and services treat
/// them as idempotent success, never as an error.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// The actor and the target of an operation are the same user
    /// (self-follow, self-block, self-unfollow).
    #[error("Cannot perform this action on yourself")]
    SelfOperation,

    /// The referenced record exists but is in the wrong state for the
    /// operation (non-pending follow request, reply to a reply, parent
    /// comment on a different post).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Content failed validation (empty, over-length, blocklisted terms,
    /// malformed identifiers).
    #[error("Content validation failed: {0}")]
    ContentValidation(String),

    /// The caller does not own the resource being modified or viewed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The action is forbidden by an existing block edge or a privacy
    /// setting the caller does not satisfy.
    #[error("Action forbidden: {0}")]
    PrivacyForbidden(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::CommentNotFound(_) => "COMMENT_NOT_FOUND",
            Self::SelfOperation => "SELF_OPERATION",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::ContentValidation(_) => "CONTENT_VALIDATION",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::PrivacyForbidden(_) => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Config(_) | Self::Internal(_))
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ContentValidation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::SelfOperation.error_code(), "SELF_OPERATION");
        assert_eq!(
            AppError::PrivacyForbidden("blocked".into()).error_code(),
            "FORBIDDEN"
        );
        assert_eq!(
            AppError::InvalidState("not pending".into()).error_code(),
            "INVALID_STATE"
        );
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::Database("boom".into()).is_server_error());
        assert!(!AppError::SelfOperation.is_server_error());
        assert!(!AppError::UserNotFound("u1".into()).is_server_error());
    }
}
