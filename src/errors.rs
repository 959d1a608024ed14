use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("MISSING_REFERENCE: {0}")]
    MissingReference(String),
    #[error("VALIDATION: {0}")]
    Validation(String),
    #[error("CONFLICT: {0}")]
    Conflict(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        match value {
            SourceError::Unavailable(message) => Self::Io(message),
            SourceError::Corrupt(message) => Self::Internal(message),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure to read one domain collection. Never fatal to a snapshot build.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("SOURCE_UNAVAILABLE: {0}")]
    Unavailable(String),
    #[error("SOURCE_CORRUPT: {0}")]
    Corrupt(String),
}

impl From<AppError> for SourceError {
    fn from(value: AppError) -> Self {
        Self::Unavailable(value.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Corrupt(value.to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(value: reqwest::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}
