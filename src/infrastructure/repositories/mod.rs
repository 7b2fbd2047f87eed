pub mod artifact_repository;
pub mod espeak_tts_backend;
pub mod festival_tts_backend;
pub mod media_library;
pub mod playlist_repository;
pub mod settings_repository;
pub mod stream_resolver;
pub mod tts_backend;

pub use artifact_repository::ArtifactRepository;
pub use espeak_tts_backend::EspeakTtsBackend;
pub use festival_tts_backend::FestivalTtsBackend;
pub use media_library::MediaLibrary;
pub use playlist_repository::PlaylistRepository;
pub use settings_repository::SettingsRepository;
pub use stream_resolver::{ResolvedStream, StreamResolver};
pub use tts_backend::{TtsBackend, TtsBackendError};
