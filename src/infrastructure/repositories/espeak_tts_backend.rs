use super::tts_backend::{TtsBackend, TtsBackendError};
use crate::infrastructure::process::{ProcessKind, ProcessSupervisor, SpawnError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// espeak speaks at 175 words per minute by default.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// espeak implementation of the TTS backend, writing WAV output
/// directly with `-w`.
pub struct EspeakTtsBackend {
    supervisor: Arc<ProcessSupervisor>,
    bin: String,
    timeout: Duration,
}

impl EspeakTtsBackend {
    pub fn new(supervisor: Arc<ProcessSupervisor>, bin: String, timeout: Duration) -> Self {
        Self {
            supervisor,
            bin,
            timeout,
        }
    }
}

fn build_args(text: &str, voice: &str, speed: f32, volume: f32, out_path: &Path) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * speed).clamp(80.0, 450.0) as i32;
    // espeak amplitude range is 0..=200; 100 is the default.
    let amplitude = (volume.clamp(0.0, 1.0) * 200.0) as i32;

    let mut args = vec![
        "-s".to_string(),
        words_per_minute.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
    ];
    if voice != "default" {
        args.push("-v".to_string());
        args.push(voice.to_string());
    }
    args.push("-w".to_string());
    args.push(out_path.display().to_string());
    // Untrusted text could start with a dash; "--" keeps espeak from
    // reading it as an option.
    args.push("--".to_string());
    args.push(text.to_string());
    args
}

#[async_trait]
impl TtsBackend for EspeakTtsBackend {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        volume: f32,
        out_path: &Path,
    ) -> Result<(), TtsBackendError> {
        let args = build_args(text, voice, speed, volume, out_path);

        let output = self
            .supervisor
            .run(ProcessKind::Tts, &self.bin, &args, self.timeout)
            .await
            .map_err(|e| match e {
                SpawnError::Timeout(_) => TtsBackendError::Timeout,
                other => TtsBackendError::Failed(other.to_string()),
            })?;

        if !output.status.success() {
            return Err(TtsBackendError::Failed(format!(
                "espeak exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !out_path.is_file() {
            return Err(TtsBackendError::Failed(
                "espeak produced no output file".to_string(),
            ));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "espeak"
    }
}
