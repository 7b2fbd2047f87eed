use serde::{Deserialize, Serialize};

use crate::domain::playback::{SessionKind, StatusSnapshot};
use crate::domain::tts::SynthesisRequest;

/// Webhook defaults for speech parameters, matching the HC3 wire
/// contract.
pub const DEFAULT_SPEECH_SPEED: f32 = 1.0;
pub const DEFAULT_SPEECH_VOLUME: f32 = 0.8;

/// A playback or synthesis command. Immutable; consumed exactly once
/// by the dispatcher.
#[derive(Debug, Clone)]
pub enum Command {
    PlayTrack { name: String },
    PlayPlaylist { name: String },
    PlaySearchStream { query: String },
    PlayUrlStream { url: String },
    PlayUrlPlaylist { url: String, shuffle: bool },
    Speak(SynthesisRequest),
    Stop,
    SetVolume { level: u8 },
    Status,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayTrack { .. } => "play_track",
            Self::PlayPlaylist { .. } => "play_playlist",
            Self::PlaySearchStream { .. } => "play_search_stream",
            Self::PlayUrlStream { .. } => "play_url_stream",
            Self::PlayUrlPlaylist { .. } => "play_url_playlist",
            Self::Speak(_) => "speak",
            Self::Stop => "stop",
            Self::SetVolume { .. } => "set_volume",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOrigin {
    HomeController,
    Webhook,
    Internal,
}

/// Result of a fully applied command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Started { kind: SessionKind, source: String },
    Stopped,
    VolumeSet { level: u8 },
    Status(StatusSnapshot),
}

/// HC3 wire command shape, shared by the TCP listener and the
/// `POST /hc3/command` route. Field and type names follow the
/// controller's original contract; legacy spellings are accepted as
/// aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Hc3Command {
    #[serde(alias = "play_song")]
    PlayMusic { song_name: String },
    PlayPlaylist { playlist_name: String },
    #[serde(alias = "play_youtube_search")]
    PlaySearch { query: String },
    #[serde(alias = "play_youtube_url")]
    PlayUrl { url: String },
    #[serde(alias = "play_youtube_playlist")]
    PlayUrlPlaylist {
        playlist_url: String,
        #[serde(default)]
        shuffle: bool,
    },
    Speak {
        text: String,
        voice: Option<String>,
        speed: Option<f32>,
        volume: Option<f32>,
    },
    #[serde(alias = "stop")]
    StopMusic,
    #[serde(alias = "set_volume")]
    Volume { volume: u8 },
    Status,
}

impl From<Hc3Command> for Command {
    fn from(wire: Hc3Command) -> Self {
        match wire {
            Hc3Command::PlayMusic { song_name } => Command::PlayTrack { name: song_name },
            Hc3Command::PlayPlaylist { playlist_name } => Command::PlayPlaylist {
                name: playlist_name,
            },
            Hc3Command::PlaySearch { query } => Command::PlaySearchStream { query },
            Hc3Command::PlayUrl { url } => Command::PlayUrlStream { url },
            Hc3Command::PlayUrlPlaylist {
                playlist_url,
                shuffle,
            } => Command::PlayUrlPlaylist {
                url: playlist_url,
                shuffle,
            },
            Hc3Command::Speak {
                text,
                voice,
                speed,
                volume,
            } => Command::Speak(SynthesisRequest::new(
                text,
                voice,
                speed.unwrap_or(DEFAULT_SPEECH_SPEED),
                volume.unwrap_or(DEFAULT_SPEECH_VOLUME),
            )),
            Hc3Command::StopMusic => Command::Stop,
            Hc3Command::Volume { volume } => Command::SetVolume { level: volume },
            Hc3Command::Status => Command::Status,
        }
    }
}
