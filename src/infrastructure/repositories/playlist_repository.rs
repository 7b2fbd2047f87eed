use std::path::PathBuf;

use crate::domain::playback::Playlist;
use crate::infrastructure::repositories::media_library::is_safe_name;

/// Playlist file layout: `{playlists_dir}/{name}.json` with a
/// `{"songs": [...]}` body.
#[derive(Debug, serde::Deserialize)]
struct PlaylistFile {
    songs: Vec<String>,
}

pub struct PlaylistRepository {
    playlists_dir: PathBuf,
}

impl PlaylistRepository {
    pub fn new(playlists_dir: PathBuf) -> Self {
        Self { playlists_dir }
    }

    /// Load a playlist by name. Returns `None` for unknown names,
    /// unsafe names, and unreadable files.
    pub fn load(&self, name: &str) -> Option<Playlist> {
        if !is_safe_name(name) {
            tracing::warn!(playlist = name, "rejected unsafe playlist name");
            return None;
        }

        let path = self.playlists_dir.join(format!("{name}.json"));
        let raw = std::fs::read_to_string(&path).ok()?;

        match serde_json::from_str::<PlaylistFile>(&raw) {
            Ok(file) if !file.songs.is_empty() => {
                Some(Playlist::new(name.to_string(), file.songs))
            }
            Ok(_) => {
                tracing::warn!(playlist = name, "playlist file contains no songs");
                None
            }
            Err(e) => {
                tracing::error!(playlist = name, error = %e, "failed to parse playlist file");
                None
            }
        }
    }
}
