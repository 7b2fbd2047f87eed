use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::model::{Command, CommandOrigin, CommandOutcome};
use crate::domain::playback::{EngineError, PlaybackEngine};
use crate::infrastructure::process::ProcessExit;

struct Envelope {
    command: Command,
    origin: CommandOrigin,
    reply: oneshot::Sender<Result<CommandOutcome, EngineError>>,
}

/// Serializes all command sources onto the single engine task.
///
/// Commands are applied strictly in submission order; process-exit
/// events interleave between commands, never inside one. Both HTTP
/// handlers and the TCP listener hold a clone of this and await their
/// reply without blocking each other's submissions.
pub struct CommandDispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl CommandDispatcher {
    /// Spawn the engine task and return a handle for submitting
    /// commands. `exit_rx` is the supervisor's exit-event stream.
    pub fn start(
        mut engine: PlaybackEngine,
        mut exit_rx: mpsc::UnboundedReceiver<ProcessExit>,
    ) -> (Arc<Self>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

        let worker = tokio::spawn(async move {
            loop {
                tokio::select! {
                    envelope = rx.recv() => {
                        let Some(Envelope { command, origin, reply }) = envelope else {
                            // All submitters dropped; release the device
                            // before exiting.
                            engine.shutdown().await;
                            break;
                        };
                        tracing::info!(command = command.name(), ?origin, "dispatching command");
                        let result = engine.handle_command(command).await;
                        if let Err(e) = &result {
                            tracing::warn!(error = %e, "command failed");
                        }
                        // A submitter that gave up waiting is fine to drop.
                        let _ = reply.send(result);
                    }
                    exit = exit_rx.recv() => {
                        match exit {
                            Some(exit) => engine.handle_exit(exit).await,
                            None => {
                                engine.shutdown().await;
                                break;
                            }
                        }
                    }
                }
            }
            tracing::info!("command dispatcher stopped");
        });

        (Arc::new(Self { tx }), worker)
    }

    /// Submit a command and wait for the engine to fully apply it.
    pub async fn submit(
        &self,
        command: Command,
        origin: CommandOrigin,
    ) -> Result<CommandOutcome, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = Envelope {
            command,
            origin,
            reply: reply_tx,
        };

        if self.tx.send(envelope).is_err() {
            return Err(EngineError::Internal(
                "command dispatcher is not running".to_string(),
            ));
        }

        reply_rx
            .await
            .map_err(|_| EngineError::Internal("engine task dropped the command".to_string()))?
    }
}
