pub mod dispatcher;
pub mod model;

pub use dispatcher::CommandDispatcher;
pub use model::{
    Command, CommandOrigin, CommandOutcome, Hc3Command, DEFAULT_SPEECH_SPEED,
    DEFAULT_SPEECH_VOLUME,
};
