pub mod error;
pub mod fingerprint;
pub mod service;

pub use error::TtsServiceError;
pub use fingerprint::{Fingerprint, SynthesisRequest};
pub use service::{AudioArtifact, TtsService, TtsServiceApi};
