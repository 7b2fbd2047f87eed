use crate::error::AppError;
use crate::infrastructure::repositories::TtsBackendError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("synthesis timed out")]
    Timeout,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<TtsBackendError> for TtsServiceError {
    fn from(err: TtsBackendError) -> Self {
        match err {
            TtsBackendError::Timeout => TtsServiceError::Timeout,
            TtsBackendError::Failed(msg) => TtsServiceError::Backend(msg),
        }
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::Timeout => AppError::Timeout("synthesis".to_string()),
            TtsServiceError::Backend(msg) => AppError::Synthesis(msg),
            TtsServiceError::Storage(msg) => AppError::Internal(msg),
        }
    }
}
