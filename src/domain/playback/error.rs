use crate::domain::tts::TtsServiceError;
use crate::error::AppError;
use crate::infrastructure::process::SpawnError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("track not found: {0}")]
    TrackNotFound(String),

    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("no playable stream for query: {0}")]
    StreamNotFound(String),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Synthesis(#[from] TtsServiceError),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    // Reserved for future multi-device support; currently unreachable
    // because supersession always wins.
    #[error("audio device busy")]
    DeviceBusy,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::TrackNotFound(msg)
            | EngineError::PlaylistNotFound(msg)
            | EngineError::StreamNotFound(msg) => AppError::NotFound(msg),
            EngineError::Spawn(SpawnError::Timeout(d)) => {
                AppError::Timeout(format!("process start ({d:?})"))
            }
            EngineError::Spawn(e) => AppError::Spawn(e.to_string()),
            EngineError::Synthesis(e) => e.into(),
            EngineError::InvalidCommand(msg) => AppError::BadRequest(msg),
            EngineError::DeviceBusy => AppError::DeviceBusy("audio device in use".to_string()),
            EngineError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
