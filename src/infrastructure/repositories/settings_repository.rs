use std::path::PathBuf;

/// Persists the mutable runtime defaults that must survive restarts.
/// Currently just the default volume.
pub struct SettingsRepository {
    volume_path: PathBuf,
}

impl SettingsRepository {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            volume_path: state_dir.join("volume"),
        }
    }

    pub fn load_default_volume(&self) -> Option<u8> {
        std::fs::read_to_string(&self.volume_path)
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    pub fn save_default_volume(&self, volume: u8) {
        if let Err(e) = std::fs::write(&self.volume_path, volume.to_string()) {
            tracing::warn!(error = %e, "failed to persist default volume");
        }
    }
}
