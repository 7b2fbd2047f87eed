use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::{
        command::{
            Command, CommandDispatcher, CommandOrigin, CommandOutcome, DEFAULT_SPEECH_SPEED,
            DEFAULT_SPEECH_VOLUME,
        },
        tts::SynthesisRequest,
    },
    error::{AppError, AppResult},
};

const MAX_TEXT_CHARS: usize = 10_000;

/// Request for POST /tts
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub volume: Option<f32>,
}

pub struct TtsController {
    dispatcher: Arc<CommandDispatcher>,
}

impl TtsController {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// POST /tts - Speak a phrase on the audio device
    pub async fn speak(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<SpeakRequest>,
    ) -> AppResult<(StatusCode, Json<CommandOutcome>)> {
        if request.text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }

        if request.text.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::PayloadTooLarge(
                "Text must be 10,000 characters or less".to_string(),
            ));
        }

        let command = Command::Speak(SynthesisRequest::new(
            request.text,
            request.voice,
            request.speed.unwrap_or(DEFAULT_SPEECH_SPEED),
            request.volume.unwrap_or(DEFAULT_SPEECH_VOLUME),
        ));

        let outcome = controller
            .dispatcher
            .submit(command, CommandOrigin::Webhook)
            .await
            .map_err(AppError::from)?;

        Ok((StatusCode::OK, Json(outcome)))
    }
}
