pub mod command;
pub mod playback;
pub mod tts;
