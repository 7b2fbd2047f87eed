use std::mem;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::error::EngineError;
use super::model::{
    EngineStateName, PlaybackSession, Playlist, SessionKind, StatusSnapshot,
};
use crate::domain::command::{Command, CommandOutcome};
use crate::domain::tts::{SynthesisRequest, TtsServiceApi};
use crate::infrastructure::process::{
    ProcessExit, ProcessId, ProcessKind, ProcessSupervisor, SpawnError,
};
use crate::infrastructure::repositories::{
    MediaLibrary, PlaylistRepository, SettingsRepository, StreamResolver,
};

/// Backoff before the single retry of a transiently failed player
/// spawn.
const SPAWN_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Shown in status output; long speech text is cut down to this many
/// characters.
const SPEECH_SOURCE_PREVIEW: usize = 40;

/// External player commands the engine spawns, resolved from config.
#[derive(Debug, Clone)]
pub struct PlayerCommands {
    pub mp3_bin: String,
    pub wav_bin: String,
    pub mixer_bin: Option<String>,
}

/// A session suspended for the duration of a speech interruption.
/// The player process is alive but SIGSTOPped.
#[derive(Debug)]
struct PausedSession {
    session: PlaybackSession,
}

enum EngineState {
    Idle,
    PlayingTrack {
        session: PlaybackSession,
    },
    PlayingPlaylist {
        session: PlaybackSession,
    },
    Speaking {
        session: PlaybackSession,
        paused: Option<PausedSession>,
    },
}

/// The state machine governing what is currently audible.
///
/// Owns the single audio-device slot: at most one `PlaybackSession`
/// exists across all states, and every transition away from a session
/// releases its process through the supervisor. The engine is driven
/// exclusively from the dispatcher task; it is not shared.
pub struct PlaybackEngine {
    supervisor: Arc<ProcessSupervisor>,
    tts: Arc<dyn TtsServiceApi>,
    library: Arc<MediaLibrary>,
    playlists: Arc<PlaylistRepository>,
    resolver: Arc<StreamResolver>,
    settings: Arc<SettingsRepository>,
    players: PlayerCommands,
    playlist_loop: bool,
    volume: u8,
    state: EngineState,
}

impl PlaybackEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        supervisor: Arc<ProcessSupervisor>,
        tts: Arc<dyn TtsServiceApi>,
        library: Arc<MediaLibrary>,
        playlists: Arc<PlaylistRepository>,
        resolver: Arc<StreamResolver>,
        settings: Arc<SettingsRepository>,
        players: PlayerCommands,
        playlist_loop: bool,
        default_volume: u8,
    ) -> Self {
        let volume = settings
            .load_default_volume()
            .unwrap_or(default_volume)
            .min(100);
        Self {
            supervisor,
            tts,
            library,
            playlists,
            resolver,
            settings,
            players,
            playlist_loop,
            volume,
            state: EngineState::Idle,
        }
    }

    /// Apply one command. Fully transitions the state machine and
    /// initiates side effects before returning; on failure the engine
    /// is `Idle` or unchanged, never holding a dangling session.
    pub async fn handle_command(&mut self, command: Command) -> Result<CommandOutcome, EngineError> {
        match command {
            Command::PlayTrack { name } => self.play_track(name).await,
            Command::PlayPlaylist { name } => self.play_playlist(name).await,
            Command::PlaySearchStream { query } => self.play_search_stream(query).await,
            Command::PlayUrlStream { url } => self.play_url_stream(url).await,
            Command::PlayUrlPlaylist { url, shuffle } => self.play_url_playlist(url, shuffle).await,
            Command::Speak(request) => self.speak(request).await,
            Command::Stop => self.stop().await,
            Command::SetVolume { level } => self.set_volume(level).await,
            Command::Status => Ok(CommandOutcome::Status(self.status())),
        }
    }

    /// Apply a process-exit notification from the supervisor. Exits of
    /// processes that no longer own the active session are ignored.
    pub async fn handle_exit(&mut self, exit: ProcessExit) {
        match mem::replace(&mut self.state, EngineState::Idle) {
            EngineState::Idle => {}
            EngineState::PlayingTrack { session } => {
                if session.process == exit.id {
                    // Crash and natural completion both end the session.
                    tracing::info!(source = %session.source, success = exit.success, "track finished");
                } else {
                    self.state = EngineState::PlayingTrack { session };
                }
            }
            EngineState::PlayingPlaylist { session } => {
                if session.process == exit.id {
                    self.advance_playlist(session).await;
                } else {
                    self.state = EngineState::PlayingPlaylist { session };
                }
            }
            EngineState::Speaking { session, paused } => {
                if session.process == exit.id {
                    tracing::info!(success = exit.success, "speech finished");
                    self.resume_paused(paused);
                } else if paused
                    .as_ref()
                    .map(|p| p.session.process == exit.id)
                    .unwrap_or(false)
                {
                    // The suspended player died while speech was
                    // active; nothing to resume afterwards.
                    tracing::warn!("paused session exited during speech");
                    self.state = EngineState::Speaking {
                        session,
                        paused: None,
                    };
                } else {
                    self.state = EngineState::Speaking { session, paused };
                }
            }
        }
    }

    /// Terminate whatever is active. Used by Stop and on daemon
    /// shutdown.
    pub async fn shutdown(&mut self) {
        self.clear_session().await;
    }

    pub fn state_name(&self) -> EngineStateName {
        match &self.state {
            EngineState::Idle => EngineStateName::Idle,
            EngineState::PlayingTrack { .. } => EngineStateName::PlayingTrack,
            EngineState::PlayingPlaylist { .. } => EngineStateName::PlayingPlaylist,
            EngineState::Speaking { .. } => EngineStateName::Speaking,
        }
    }

    async fn play_track(&mut self, name: String) -> Result<CommandOutcome, EngineError> {
        // Resolve before superseding so an unknown track leaves the
        // current session untouched.
        let path = self
            .library
            .find_track(&name)
            .ok_or_else(|| EngineError::TrackNotFound(name.clone()))?;

        self.clear_session().await;

        let process = self.spawn_player(&path.display().to_string()).await?;
        tracing::info!(track = %name, "playing track");
        self.state = EngineState::PlayingTrack {
            session: PlaybackSession::track(name.clone(), process),
        };
        Ok(CommandOutcome::Started {
            kind: SessionKind::Track,
            source: name,
        })
    }

    async fn play_playlist(&mut self, name: String) -> Result<CommandOutcome, EngineError> {
        let playlist = self
            .playlists
            .load(&name)
            .ok_or_else(|| EngineError::PlaylistNotFound(name.clone()))?;

        let (position, target) = self
            .next_playable(&playlist, 0, playlist.len())
            .ok_or_else(|| EngineError::TrackNotFound(format!("no playable track in {name}")))?;

        self.clear_session().await;

        let process = self.spawn_player(&target).await?;
        tracing::info!(playlist = %name, position, "playing playlist");
        self.state = EngineState::PlayingPlaylist {
            session: PlaybackSession::playlist(playlist, position, process),
        };
        Ok(CommandOutcome::Started {
            kind: SessionKind::Playlist,
            source: name,
        })
    }

    async fn play_search_stream(&mut self, query: String) -> Result<CommandOutcome, EngineError> {
        let resolved = self
            .resolver
            .resolve_search(&query)
            .await?
            .ok_or_else(|| EngineError::StreamNotFound(query.clone()))?;

        self.clear_session().await;

        let process = self.spawn_player(&resolved.url).await?;
        tracing::info!(query = %query, title = %resolved.title, "playing stream");
        self.state = EngineState::PlayingTrack {
            session: PlaybackSession::stream(resolved.title.clone(), process),
        };
        Ok(CommandOutcome::Started {
            kind: SessionKind::Stream,
            source: resolved.title,
        })
    }

    async fn play_url_stream(&mut self, url: String) -> Result<CommandOutcome, EngineError> {
        if !is_http_url(&url) {
            return Err(EngineError::InvalidCommand(format!(
                "not an http(s) URL: {url}"
            )));
        }

        let resolved = self
            .resolver
            .resolve_url(&url)
            .await?
            .ok_or_else(|| EngineError::StreamNotFound(url.clone()))?;

        self.clear_session().await;

        let process = self.spawn_player(&resolved.url).await?;
        tracing::info!(url = %url, title = %resolved.title, "playing stream from URL");
        self.state = EngineState::PlayingTrack {
            session: PlaybackSession::stream(resolved.title.clone(), process),
        };
        Ok(CommandOutcome::Started {
            kind: SessionKind::Stream,
            source: resolved.title,
        })
    }

    /// Play a remote playlist URL. Its entries are resolved up front to
    /// stream URLs and then driven by the normal playlist machinery.
    async fn play_url_playlist(
        &mut self,
        url: String,
        shuffle: bool,
    ) -> Result<CommandOutcome, EngineError> {
        if !is_http_url(&url) {
            return Err(EngineError::InvalidCommand(format!(
                "not an http(s) URL: {url}"
            )));
        }

        let streams = self.resolver.resolve_playlist(&url, shuffle).await?;
        if streams.is_empty() {
            return Err(EngineError::StreamNotFound(url));
        }

        let entries: Vec<String> = streams.into_iter().map(|s| s.url).collect();
        let playlist = Playlist::new(url.clone(), entries);

        self.clear_session().await;

        // Entries are already playable URLs, so the first one starts
        // without a library scan.
        let (position, target) = self
            .next_playable(&playlist, 0, playlist.len())
            .ok_or_else(|| EngineError::StreamNotFound(url.clone()))?;

        let process = self.spawn_player(&target).await?;
        tracing::info!(url = %url, entries = playlist.len(), "playing remote playlist");
        self.state = EngineState::PlayingPlaylist {
            session: PlaybackSession::playlist(playlist, position, process),
        };
        Ok(CommandOutcome::Started {
            kind: SessionKind::Playlist,
            source: url,
        })
    }

    async fn speak(&mut self, request: SynthesisRequest) -> Result<CommandOutcome, EngineError> {
        // Suspension point: concurrent identical requests coalesce in
        // the cache, and nothing is touched until audio exists.
        let artifact = self.tts.synthesize(request.clone()).await?;

        let paused = self.pause_for_speech().await;

        let process = match self.spawn_player(&artifact.path.display().to_string()).await {
            Ok(process) => process,
            Err(e) => {
                // Give the interrupted session back its device.
                self.resume_paused(paused);
                return Err(e);
            }
        };

        let preview: String = request
            .normalized_text()
            .chars()
            .take(SPEECH_SOURCE_PREVIEW)
            .collect();
        tracing::info!(text = %preview, "speaking");
        self.state = EngineState::Speaking {
            session: PlaybackSession::speech(preview.clone(), process),
            paused,
        };
        Ok(CommandOutcome::Started {
            kind: SessionKind::Speech,
            source: preview,
        })
    }

    async fn stop(&mut self) -> Result<CommandOutcome, EngineError> {
        // Stopping while idle is a successful no-op.
        self.clear_session().await;
        Ok(CommandOutcome::Stopped)
    }

    async fn set_volume(&mut self, level: u8) -> Result<CommandOutcome, EngineError> {
        let level = level.min(100);
        self.volume = level;
        self.settings.save_default_volume(level);

        let session_active = !matches!(self.state, EngineState::Idle);
        if session_active {
            if let Some(mixer) = self.players.mixer_bin.clone() {
                let args = vec![
                    "set".to_string(),
                    "Master".to_string(),
                    format!("{level}%"),
                ];
                // Best effort; a missing mixer must not fail the command.
                if let Err(e) = self
                    .supervisor
                    .run(ProcessKind::Mixer, &mixer, &args, Duration::from_secs(5))
                    .await
                {
                    tracing::warn!(error = %e, "failed to apply volume to mixer");
                }
            }
        }

        tracing::info!(volume = level, session_active, "volume updated");
        Ok(CommandOutcome::VolumeSet { level })
    }

    fn status(&self) -> StatusSnapshot {
        let session = match &self.state {
            EngineState::Idle => None,
            EngineState::PlayingTrack { session }
            | EngineState::PlayingPlaylist { session }
            | EngineState::Speaking { session, .. } => Some(session.summary()),
        };
        StatusSnapshot {
            state: self.state_name(),
            session,
            volume: self.volume,
        }
    }

    /// Advance past a finished playlist entry, looping at the end when
    /// configured. Unplayable entries are skipped.
    async fn advance_playlist(&mut self, session: PlaybackSession) {
        let playlist = match session.playlist {
            Some(playlist) => playlist,
            None => return,
        };

        let next = session.position + 1;
        let (from, budget) = if next >= playlist.len() {
            if !self.playlist_loop {
                tracing::info!(playlist = %playlist.name(), "playlist finished");
                return;
            }
            (0, playlist.len())
        } else {
            let budget = if self.playlist_loop {
                playlist.len()
            } else {
                playlist.len() - next
            };
            (next, budget)
        };

        let (position, target) = match self.next_playable(&playlist, from, budget) {
            Some(found) => found,
            None => {
                tracing::warn!(playlist = %playlist.name(), "no playable tracks remain");
                return;
            }
        };

        match self.spawn_player(&target).await {
            Ok(process) => {
                tracing::info!(playlist = %playlist.name(), position, "advanced to next track");
                self.state = EngineState::PlayingPlaylist {
                    session: PlaybackSession::playlist(playlist, position, process),
                };
            }
            Err(e) => {
                // No caller to surface to from the exit path; log and
                // fall back to idle.
                tracing::error!(error = %e, "failed to start next playlist track");
            }
        }
    }

    /// Scan up to `budget` entries starting at `from` (wrapping when
    /// looping) for a playable target. Stream URLs play as-is; bare
    /// names must resolve through the library.
    fn next_playable(
        &self,
        playlist: &Playlist,
        from: usize,
        budget: usize,
    ) -> Option<(usize, String)> {
        for step in 0..budget {
            let position = (from + step) % playlist.len();
            let entry = playlist.track_at(position)?;
            if is_http_url(entry) {
                return Some((position, entry.to_string()));
            }
            if let Some(path) = self.library.find_track(entry) {
                return Some((position, path.display().to_string()));
            }
            tracing::warn!(playlist = %playlist.name(), track = entry, "skipping missing track");
        }
        None
    }

    /// Suspend the active session ahead of speech. A session whose
    /// player cannot be SIGSTOPped is terminated instead and will not
    /// be resumed; an active speech session is superseded and its own
    /// paused session inherited.
    async fn pause_for_speech(&mut self) -> Option<PausedSession> {
        match mem::replace(&mut self.state, EngineState::Idle) {
            EngineState::Idle => None,
            EngineState::PlayingTrack { session } | EngineState::PlayingPlaylist { session } => {
                if self.supervisor.suspend(session.process) {
                    tracing::debug!(source = %session.source, "session suspended for speech");
                    Some(PausedSession { session })
                } else {
                    tracing::warn!(source = %session.source, "suspend failed, stopping session");
                    self.supervisor.terminate(session.process).await;
                    None
                }
            }
            EngineState::Speaking { session, paused } => {
                self.supervisor.terminate(session.process).await;
                paused
            }
        }
    }

    /// Restore a suspended session after speech, or fall back to idle.
    fn resume_paused(&mut self, paused: Option<PausedSession>) {
        let Some(PausedSession { session }) = paused else {
            self.state = EngineState::Idle;
            return;
        };

        if self.supervisor.resume(session.process) {
            tracing::info!(source = %session.source, "session resumed after speech");
            self.state = match session.kind {
                SessionKind::Playlist => EngineState::PlayingPlaylist { session },
                _ => EngineState::PlayingTrack { session },
            };
        } else {
            tracing::warn!(source = %session.source, "resume failed, session dropped");
            self.state = EngineState::Idle;
        }
    }

    /// Release every process owned by the current state. All exit
    /// paths from a session funnel through here, so no transition can
    /// orphan a player.
    async fn clear_session(&mut self) {
        match mem::replace(&mut self.state, EngineState::Idle) {
            EngineState::Idle => {}
            EngineState::PlayingTrack { session } | EngineState::PlayingPlaylist { session } => {
                self.supervisor.terminate(session.process).await;
            }
            EngineState::Speaking { session, paused } => {
                self.supervisor.terminate(session.process).await;
                if let Some(paused) = paused {
                    self.supervisor.terminate(paused.session.process).await;
                }
            }
        }
    }

    /// Spawn a player for a file path or stream URL, retrying once on
    /// transient I/O failure.
    async fn spawn_player(&self, target: &str) -> Result<ProcessId, EngineError> {
        let (bin, args) = self.player_command(target);

        let first = self.supervisor.spawn(ProcessKind::Player, &bin, &args);
        let process = match first {
            Ok(process) => process,
            Err(SpawnError::Io { program, source }) => {
                tracing::warn!(program = %program, error = %source, "player spawn failed, retrying");
                tokio::time::sleep(SPAWN_RETRY_BACKOFF).await;
                self.supervisor.spawn(ProcessKind::Player, &bin, &args)?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(process.id)
    }

    fn player_command(&self, target: &str) -> (String, Vec<String>) {
        let is_mp3 = Path::new(target)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("mp3"))
            .unwrap_or(false);
        if is_mp3 || is_http_url(target) {
            (
                self.players.mp3_bin.clone(),
                vec!["-q".to_string(), target.to_string()],
            )
        } else {
            (self.players.wav_bin.clone(), vec![target.to_string()])
        }
    }
}

fn is_http_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}
