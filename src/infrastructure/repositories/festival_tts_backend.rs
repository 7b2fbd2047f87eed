use super::tts_backend::{TtsBackend, TtsBackendError};
use crate::infrastructure::process::{ProcessKind, ProcessSupervisor, SpawnError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Festival implementation of the TTS backend.
///
/// Uses `text2wave` (part of the festival suite) rather than
/// `festival --tts`, because the latter plays straight to the sound
/// device and cannot feed the artifact cache.
pub struct FestivalTtsBackend {
    supervisor: Arc<ProcessSupervisor>,
    bin: String,
    timeout: Duration,
}

impl FestivalTtsBackend {
    pub fn new(supervisor: Arc<ProcessSupervisor>, bin: String, timeout: Duration) -> Self {
        Self {
            supervisor,
            bin,
            timeout,
        }
    }
}

#[async_trait]
impl TtsBackend for FestivalTtsBackend {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        volume: f32,
        out_path: &Path,
    ) -> Result<(), TtsBackendError> {
        if voice != "default" {
            tracing::debug!(voice, "festival backend ignores voice selection");
        }
        if (speed - 1.0).abs() > f32::EPSILON {
            tracing::debug!(speed, "festival backend ignores speed");
        }

        // text2wave reads the text from a file.
        let input_path = out_path.with_extension("txt");
        tokio::fs::write(&input_path, text)
            .await
            .map_err(|e| TtsBackendError::Failed(format!("failed to write synthesis input: {e}")))?;

        let args = vec![
            "-scale".to_string(),
            format!("{:.2}", volume.clamp(0.0, 1.0)),
            "-o".to_string(),
            out_path.display().to_string(),
            input_path.display().to_string(),
        ];

        let result = self
            .supervisor
            .run(ProcessKind::Tts, &self.bin, &args, self.timeout)
            .await;

        let _ = tokio::fs::remove_file(&input_path).await;

        let output = result.map_err(|e| match e {
            SpawnError::Timeout(_) => TtsBackendError::Timeout,
            other => TtsBackendError::Failed(other.to_string()),
        })?;
        if !output.status.success() {
            return Err(TtsBackendError::Failed(format!(
                "text2wave exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !out_path.is_file() {
            return Err(TtsBackendError::Failed(
                "text2wave produced no output file".to_string(),
            ));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "festival"
    }
}
