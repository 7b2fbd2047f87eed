pub mod hc3;
pub mod health;
pub mod status;
pub mod tts;
