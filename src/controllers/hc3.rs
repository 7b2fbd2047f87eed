use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::command::{Command, CommandDispatcher, CommandOrigin, CommandOutcome, Hc3Command},
    error::{AppError, AppResult},
};

/// HTTP delivery path for home-controller commands, mirroring the TCP
/// listener's wire contract.
pub struct Hc3Controller {
    dispatcher: Arc<CommandDispatcher>,
}

impl Hc3Controller {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// POST /hc3/command - Apply a home-controller command
    pub async fn command(
        State(controller): State<Arc<Hc3Controller>>,
        Json(wire): Json<Hc3Command>,
    ) -> AppResult<(StatusCode, Json<CommandOutcome>)> {
        let command = Command::from(wire);

        let outcome = controller
            .dispatcher
            .submit(command, CommandOrigin::HomeController)
            .await
            .map_err(AppError::from)?;

        Ok((StatusCode::OK, Json(outcome)))
    }
}
