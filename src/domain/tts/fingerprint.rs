use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Speed is normalized to hundredths before hashing so float
/// representation noise cannot split the cache.
const SPEED_PRECISION: f32 = 100.0;

/// One synthesis request. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: Option<String>,
    pub speed: f32,
    pub volume: f32,
}

impl SynthesisRequest {
    pub fn new(text: String, voice: Option<String>, speed: f32, volume: f32) -> Self {
        Self {
            text,
            voice,
            speed,
            volume,
        }
    }

    pub fn normalized_text(&self) -> &str {
        self.text.trim()
    }

    pub fn voice_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.voice.as_deref().unwrap_or(default)
    }

    /// Speed in hundredths, clamped to espeak's practical range.
    pub fn speed_hundredths(&self) -> i32 {
        (self.speed.clamp(0.25, 4.0) * SPEED_PRECISION).round() as i32
    }

    /// Volume as integer percent, 0..=100.
    pub fn volume_percent(&self) -> i32 {
        (self.volume.clamp(0.0, 1.0) * 100.0).round() as i32
    }

    pub fn normalized_speed(&self) -> f32 {
        self.speed_hundredths() as f32 / SPEED_PRECISION
    }

    pub fn normalized_volume(&self) -> f32 {
        self.volume_percent() as f32 / 100.0
    }

    /// Deterministic fingerprint of the normalized request tuple.
    ///
    /// Stable across process restarts so the durable artifact store
    /// stays valid.
    pub fn fingerprint(&self, default_voice: &str) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"v1");
        hasher.update([0]);
        hasher.update(self.normalized_text().as_bytes());
        hasher.update([0]);
        hasher.update(self.voice_or(default_voice).as_bytes());
        hasher.update([0]);
        hasher.update(self.speed_hundredths().to_le_bytes());
        hasher.update([0]);
        hasher.update(self.volume_percent().to_le_bytes());

        let digest = hasher.finalize();
        let mut hex = String::with_capacity(64);
        for byte in digest {
            use std::fmt::Write;
            let _ = write!(hex, "{byte:02x}");
        }
        Fingerprint(hex)
    }
}

/// Hex-encoded SHA-256 digest identifying a synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
