pub mod engine;
pub mod error;
pub mod model;

pub use engine::{PlaybackEngine, PlayerCommands};
pub use error::EngineError;
pub use model::{
    EngineStateName, PlaybackSession, Playlist, SessionKind, SessionSummary, StatusSnapshot,
};
