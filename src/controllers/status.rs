use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    domain::{
        command::{Command, CommandDispatcher, CommandOrigin, CommandOutcome},
        playback::StatusSnapshot,
    },
    error::{AppError, AppResult},
};

pub struct StatusController {
    dispatcher: Arc<CommandDispatcher>,
}

impl StatusController {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// GET /status - Engine state, active session and volume
    pub async fn get_status(
        State(controller): State<Arc<StatusController>>,
    ) -> AppResult<Json<StatusSnapshot>> {
        let outcome = controller
            .dispatcher
            .submit(Command::Status, CommandOrigin::Webhook)
            .await
            .map_err(AppError::from)?;

        match outcome {
            CommandOutcome::Status(snapshot) => Ok(Json(snapshot)),
            other => Err(AppError::Internal(format!(
                "unexpected outcome for status query: {other:?}"
            ))),
        }
    }
}
