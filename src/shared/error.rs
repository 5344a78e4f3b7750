use crate::shared::validation::ValidationFailureKind;
use thiserror::Error;

/// Backend message used when an identity has never written a profile.
pub const MISSING_PROFILE_MESSAGE: &str = "No profile found";

/// 共有 in-flight クエリの結果を複数の待機者へ配るため `Clone` を実装する。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error ({kind}): {message}")]
    ValidationError {
        kind: ValidationFailureKind,
        message: String,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(kind: ValidationFailureKind, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            kind,
            message: message.into(),
        }
    }

    pub fn validation_kind(&self) -> Option<ValidationFailureKind> {
        match self {
            AppError::ValidationError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// プロフィール未作成（初回セットアップが必要）を示すエラーかどうか。
    ///
    /// Backends report this either as a typed not-found or as an application
    /// error carrying the "No profile found" message.
    pub fn is_missing_profile(&self) -> bool {
        match self {
            AppError::NotFound(_) => true,
            AppError::Backend(message) => message.contains(MISSING_PROFILE_MESSAGE),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
