use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum TtsBackendError {
    #[error("{0}")]
    Failed(String),

    #[error("synthesis timed out")]
    Timeout,
}

/// Capability interface for TTS synthesis backends.
/// Abstracts the underlying engine (espeak, festival, ...)
///
/// Implementations are responsible for:
/// - Mapping speed/volume onto engine-specific parameters
/// - Writing a complete WAV file to the requested path
/// - Running the engine under the process supervisor with a timeout
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize text into a WAV file at `out_path`.
    ///
    /// # Arguments
    /// * `text` - The normalized text to synthesize
    /// * `voice` - Backend voice identifier ("default" selects the
    ///   engine's built-in voice)
    /// * `speed` - Speech rate multiplier, 1.0 = normal
    /// * `volume` - Output volume in 0.0..=1.0
    ///
    /// # Errors
    /// Returns an error if synthesis fails, times out, or the engine is
    /// unavailable
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        volume: f32,
        out_path: &Path,
    ) -> Result<(), TtsBackendError>;

    fn name(&self) -> &'static str;
}
