use std::path::{Path, PathBuf};

/// Audio file extensions tried when looking a track up by bare name.
const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "ogg", "m4a"];

/// Filesystem music library. Resolves user-supplied track names to
/// playable file paths; never hands untrusted text to a shell.
pub struct MediaLibrary {
    music_dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(music_dir: PathBuf) -> Self {
        Self { music_dir }
    }

    /// Resolve a track name to a file path.
    ///
    /// Exact matches against the supported extensions win; otherwise
    /// the library is scanned for a case-insensitive substring match on
    /// the file stem.
    pub fn find_track(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_name(name) {
            tracing::warn!(track = name, "rejected unsafe track name");
            return None;
        }

        for ext in SUPPORTED_EXTENSIONS {
            let candidate = self.music_dir.join(format!("{name}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let needle = name.to_lowercase();
        scan_for_stem(&self.music_dir, &needle)
    }
}

fn scan_for_stem(dir: &Path, needle: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if stem.to_lowercase().contains(needle) && has_supported_extension(&path) {
                return Some(path);
            }
        }
    }

    subdirs.into_iter().find_map(|d| scan_for_stem(&d, needle))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Track and playlist names come from untrusted origins; anything that
/// could escape the library directory is rejected outright.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && !name.starts_with('.')
}
