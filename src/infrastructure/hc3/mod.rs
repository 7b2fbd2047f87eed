use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::domain::command::{Command, CommandDispatcher, CommandOrigin, Hc3Command};

#[derive(Debug, Serialize)]
struct ErrorLine {
    result: &'static str,
    message: String,
}

impl ErrorLine {
    fn new(message: String) -> Self {
        Self {
            result: "error",
            message,
        }
    }
}

/// TCP command channel for the home controller.
///
/// One JSON command per line, one JSON result per line, in order.
/// Connections are long-lived; the controller keeps one open and sends
/// commands as scenes fire.
pub async fn start_hc3_listener(
    host: String,
    port: u16,
    dispatcher: Arc<CommandDispatcher>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    run_hc3_listener(listener, dispatcher).await
}

/// Accept loop over an already-bound listener.
pub async fn run_hc3_listener(
    listener: TcpListener,
    dispatcher: Arc<CommandDispatcher>,
) -> std::io::Result<()> {
    tracing::info!("HC3 listener on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::info!(%peer, "HC3 connection accepted");

        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream, dispatcher).await {
                tracing::warn!(%peer, error = %e, "HC3 connection error");
            }
            tracing::info!(%peer, "HC3 connection closed");
        });
    }
}

async fn serve_connection(
    stream: TcpStream,
    dispatcher: Arc<CommandDispatcher>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&line, &dispatcher).await;
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Parse and apply one command line, rendering the outcome (or the
/// failure) as a single JSON line. A malformed line never tears down
/// the connection.
async fn handle_line(line: &str, dispatcher: &CommandDispatcher) -> String {
    let wire: Hc3Command = match serde_json::from_str(line) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable HC3 command");
            return error_line(format!("invalid command: {e}"));
        }
    };

    let command = Command::from(wire);
    tracing::debug!(command = command.name(), "HC3 command received");

    match dispatcher
        .submit(command, CommandOrigin::HomeController)
        .await
    {
        Ok(outcome) => {
            serde_json::to_string(&outcome).unwrap_or_else(|e| error_line(e.to_string()))
        }
        Err(e) => error_line(e.to_string()),
    }
}

fn error_line(message: String) -> String {
    serde_json::to_string(&ErrorLine::new(message))
        .unwrap_or_else(|_| r#"{"result":"error","message":"internal error"}"#.to_string())
}
