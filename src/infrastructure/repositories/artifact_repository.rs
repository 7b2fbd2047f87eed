use std::path::PathBuf;

use crate::domain::tts::Fingerprint;

/// Durable store for synthesized audio, addressed by synthesis
/// fingerprint. Survives daemon restarts; the in-memory cache is
/// re-admitted from here on a miss.
pub struct ArtifactRepository {
    cache_dir: PathBuf,
}

impl ArtifactRepository {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Target path for an artifact. Backends write the WAV here.
    pub fn artifact_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.cache_dir.join(format!("{fingerprint}.wav"))
    }

    /// Whether a completed artifact exists on disk.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        let path = self.artifact_path(fingerprint);
        path.is_file()
            && std::fs::metadata(&path)
                .map(|m| m.len() > 0)
                .unwrap_or(false)
    }

    /// Remove a half-written artifact after a failed synthesis.
    pub fn discard(&self, fingerprint: &Fingerprint) {
        let path = self.artifact_path(fingerprint);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to discard artifact");
            }
        }
    }

}
