use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// Opaque token for a supervised process. Other components hold this
/// instead of the OS child handle; the supervisor is the sole owner of
/// the handle itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ProcessId(Uuid);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Player,
    Tts,
    Fetcher,
    Mixer,
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Tts => write!(f, "tts"),
            Self::Fetcher => write!(f, "fetcher"),
            Self::Mixer => write!(f, "mixer"),
        }
    }
}

/// Notification published when a supervised process exits, in the order
/// the exits are observed.
#[derive(Debug, Clone)]
pub struct ProcessExit {
    pub id: ProcessId,
    pub kind: ProcessKind,
    pub success: bool,
    pub code: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("executable not found: {0}")]
    NotFound(String),

    #[error("failed to spawn {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("process exceeded timeout of {0:?}")]
    Timeout(Duration),
}

/// Reference to a spawned process returned to callers. Holds only
/// identifiers, never the child handle.
#[derive(Debug, Clone, Copy)]
pub struct ManagedProcess {
    pub id: ProcessId,
    pub kind: ProcessKind,
}

struct ProcessEntry {
    pid: u32,
    kind: ProcessKind,
    exited: watch::Receiver<bool>,
}

/// Launches, monitors and terminates the external audio-producing
/// processes (players, TTS backends, stream fetchers).
///
/// Every spawned process is either explicitly terminated or observed to
/// exit by its waiter task; exits are published on the channel returned
/// from [`ProcessSupervisor::new`].
pub struct ProcessSupervisor {
    table: Mutex<HashMap<ProcessId, ProcessEntry>>,
    exit_tx: mpsc::UnboundedSender<ProcessExit>,
    grace: Duration,
}

impl ProcessSupervisor {
    pub fn new(grace: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<ProcessExit>) {
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                table: Mutex::new(HashMap::new()),
                exit_tx,
                grace,
            }),
            exit_rx,
        )
    }

    /// Spawn a long-lived process and register it for supervision.
    ///
    /// Stdout and stderr are streamed to the log sink without
    /// interpretation; the exit status is published when the process
    /// terminates.
    pub fn spawn(
        self: &Arc<Self>,
        kind: ProcessKind,
        program: &str,
        args: &[String],
    ) -> Result<ManagedProcess, SpawnError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| map_spawn_error(program, e))?;

        let id = ProcessId(Uuid::new_v4());
        let pid = child.id().unwrap_or_default();

        tracing::info!(process_id = %id, %kind, program, pid, "process spawned");

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(id, kind, "stdout", stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(id, kind, "stderr", stderr));
        }

        let (exited_tx, exited_rx) = watch::channel(false);
        self.table.lock().unwrap().insert(
            id,
            ProcessEntry {
                pid,
                kind,
                exited: exited_rx,
            },
        );

        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            let status = child.wait().await;
            supervisor.table.lock().unwrap().remove(&id);

            let (success, code) = match status {
                Ok(s) => (s.success(), s.code()),
                Err(e) => {
                    tracing::warn!(process_id = %id, error = %e, "failed to reap process");
                    (false, None)
                }
            };

            tracing::info!(process_id = %id, %kind, success, code, "process exited");

            let _ = exited_tx.send(true);
            let _ = supervisor.exit_tx.send(ProcessExit {
                id,
                kind,
                success,
                code,
            });
        });

        Ok(ManagedProcess { id, kind })
    }

    /// Gracefully terminate a process, escalating to SIGKILL after the
    /// grace period. Terminating an unknown or already-exited process
    /// is a no-op.
    pub async fn terminate(&self, id: ProcessId) {
        let (pid, mut exited) = {
            let table = self.table.lock().unwrap();
            match table.get(&id) {
                Some(entry) => (entry.pid, entry.exited.clone()),
                None => return,
            }
        };

        tracing::debug!(process_id = %id, pid, "terminating process");

        // A SIGSTOPped child never sees SIGTERM; wake it first.
        signal(pid, libc::SIGCONT);
        signal(pid, libc::SIGTERM);

        if wait_exited(&mut exited, self.grace).await {
            return;
        }

        tracing::warn!(process_id = %id, pid, "grace period elapsed, sending SIGKILL");
        signal(pid, libc::SIGKILL);
        wait_exited(&mut exited, self.grace).await;
    }

    /// Suspend a process with SIGSTOP. Returns false if the process is
    /// unknown or the signal could not be delivered.
    pub fn suspend(&self, id: ProcessId) -> bool {
        match self.pid_of(id) {
            Some(pid) => signal(pid, libc::SIGSTOP),
            None => false,
        }
    }

    /// Resume a SIGSTOPped process with SIGCONT.
    pub fn resume(&self, id: ProcessId) -> bool {
        match self.pid_of(id) {
            Some(pid) => signal(pid, libc::SIGCONT),
            None => false,
        }
    }

    /// Whether a process is still registered (spawned and not yet
    /// observed to exit).
    pub fn is_running(&self, id: ProcessId) -> bool {
        self.table.lock().unwrap().contains_key(&id)
    }

    /// Wait for a supervised process to exit without consuming the
    /// shared exit-event stream.
    pub async fn await_exit(&self, id: ProcessId) {
        let mut exited = {
            let table = self.table.lock().unwrap();
            match table.get(&id) {
                Some(entry) => entry.exited.clone(),
                None => return,
            }
        };
        let _ = exited.wait_for(|done| *done).await;
    }

    /// Run a short-lived process to completion with captured output.
    ///
    /// Used for TTS backends and the stream fetcher, which produce a
    /// file or a few lines of output rather than a stream of audio. On
    /// timeout the child is killed and a timeout error surfaces.
    pub async fn run(
        &self,
        kind: ProcessKind,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<std::process::Output, SpawnError> {
        tracing::debug!(%kind, program, ?args, "running process to completion");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| map_spawn_error(program, e))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| SpawnError::Timeout(timeout))?
            .map_err(|e| SpawnError::Io {
                program: program.to_string(),
                source: e,
            })?;

        if !output.status.success() {
            tracing::warn!(
                %kind,
                program,
                code = output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "process finished with non-zero status"
            );
        }

        Ok(output)
    }

    fn pid_of(&self, id: ProcessId) -> Option<u32> {
        self.table.lock().unwrap().get(&id).map(|e| e.pid)
    }
}

async fn wait_exited(exited: &mut watch::Receiver<bool>, limit: Duration) -> bool {
    tokio::time::timeout(limit, exited.wait_for(|done| *done))
        .await
        .is_ok()
}

async fn forward_output(
    id: ProcessId,
    kind: ProcessKind,
    stream: &'static str,
    reader: impl tokio::io::AsyncRead + Unpin,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(process_id = %id, %kind, stream, "{}", line);
    }
}

fn map_spawn_error(program: &str, e: std::io::Error) -> SpawnError {
    if e.kind() == std::io::ErrorKind::NotFound {
        SpawnError::NotFound(program.to_string())
    } else {
        SpawnError::Io {
            program: program.to_string(),
            source: e,
        }
    }
}

fn signal(pid: u32, sig: libc::c_int) -> bool {
    if pid == 0 {
        return false;
    }
    // ESRCH means the process already exited, which callers treat as
    // success for idempotency.
    unsafe { libc::kill(pid as libc::pid_t, sig) == 0 }
}
