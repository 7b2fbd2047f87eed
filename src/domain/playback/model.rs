use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::infrastructure::process::ProcessId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Track,
    Playlist,
    Stream,
    Speech,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Track => write!(f, "track"),
            Self::Playlist => write!(f, "playlist"),
            Self::Stream => write!(f, "stream"),
            Self::Speech => write!(f, "speech"),
        }
    }
}

/// An ordered, named sequence of track references. Immutable; the
/// position lives in the owning session, never here, so playlists can
/// be shared and reloaded freely.
#[derive(Debug, Clone)]
pub struct Playlist {
    name: String,
    tracks: Vec<String>,
}

impl Playlist {
    pub fn new(name: String, tracks: Vec<String>) -> Self {
        Self { name, tracks }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track_at(&self, position: usize) -> Option<&str> {
        self.tracks.get(position).map(|s| s.as_str())
    }
}

/// One active audio-producing activity. Exactly one session exists
/// while anything is audible; this is the device-exclusivity
/// invariant.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub id: Uuid,
    pub kind: SessionKind,
    pub source: String,
    pub process: ProcessId,
    pub started_at: DateTime<Utc>,
    pub playlist: Option<Playlist>,
    pub position: usize,
}

impl PlaybackSession {
    pub fn track(source: String, process: ProcessId) -> Self {
        Self::new(SessionKind::Track, source, process, None, 0)
    }

    pub fn stream(source: String, process: ProcessId) -> Self {
        Self::new(SessionKind::Stream, source, process, None, 0)
    }

    pub fn speech(source: String, process: ProcessId) -> Self {
        Self::new(SessionKind::Speech, source, process, None, 0)
    }

    pub fn playlist(playlist: Playlist, position: usize, process: ProcessId) -> Self {
        let source = playlist.name().to_string();
        Self::new(
            SessionKind::Playlist,
            source,
            process,
            Some(playlist),
            position,
        )
    }

    fn new(
        kind: SessionKind,
        source: String,
        process: ProcessId,
        playlist: Option<Playlist>,
        position: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            source,
            process,
            started_at: Utc::now(),
            playlist,
            position,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            kind: self.kind,
            source: self.source.clone(),
            started_at: self.started_at,
            position: self.playlist.as_ref().map(|_| self.position),
            playlist_length: self.playlist.as_ref().map(|p| p.len()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub kind: SessionKind,
    pub source: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_length: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStateName {
    Idle,
    PlayingTrack,
    PlayingPlaylist,
    Speaking,
}

/// Read-only view of the engine, served by the Status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: EngineStateName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSummary>,
    pub volume: u8,
}
