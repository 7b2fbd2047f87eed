use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediad::controllers::{hc3::Hc3Controller, status::StatusController, tts::TtsController};
use mediad::domain::command::{Command, CommandDispatcher, CommandOrigin};
use mediad::domain::playback::{PlaybackEngine, PlayerCommands};
use mediad::domain::tts::TtsService;
use mediad::infrastructure::config::{Config, LogFormat, TtsBackendKind};
use mediad::infrastructure::hc3::start_hc3_listener;
use mediad::infrastructure::http::start_http_server;
use mediad::infrastructure::process::ProcessSupervisor;
use mediad::infrastructure::repositories::{
    ArtifactRepository, EspeakTtsBackend, FestivalTtsBackend, MediaLibrary, PlaylistRepository,
    SettingsRepository, StreamResolver, TtsBackend,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting mediad on {}:{}",
        config.host,
        config.port
    );

    config.create_directories()?;
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Process supervisor; every external binary goes through it
    let (supervisor, exit_rx) =
        ProcessSupervisor::new(Duration::from_millis(config.terminate_grace_ms));

    // 2. Filesystem repositories
    tracing::info!("Instantiating repositories...");
    let library = Arc::new(MediaLibrary::new(config.music_dir.clone()));
    let playlists = Arc::new(PlaylistRepository::new(config.playlists_dir.clone()));
    let artifacts = Arc::new(ArtifactRepository::new(config.tts_cache_dir.clone()));
    let settings = Arc::new(SettingsRepository::new(config.state_dir.clone()));

    // 3. Synthesis backend and service
    let synthesis_timeout = Duration::from_secs(config.synthesis_timeout_secs);
    let backend: Arc<dyn TtsBackend> = match config.tts_backend {
        TtsBackendKind::Espeak => Arc::new(EspeakTtsBackend::new(
            supervisor.clone(),
            config.espeak_bin.clone(),
            synthesis_timeout,
        )),
        TtsBackendKind::Festival => Arc::new(FestivalTtsBackend::new(
            supervisor.clone(),
            config.text2wave_bin.clone(),
            synthesis_timeout,
        )),
    };
    tracing::info!(backend = backend.name(), "TTS backend configured");
    let tts_service = Arc::new(TtsService::new(
        backend,
        artifacts.clone(),
        config.tts_cache_capacity,
        config.tts_default_voice.clone(),
    ));

    let resolver = Arc::new(StreamResolver::new(
        supervisor.clone(),
        config.ytdlp_bin.clone(),
        Duration::from_secs(config.resolver_timeout_secs),
    ));

    // 4. Playback engine and its dispatcher task
    let engine = PlaybackEngine::new(
        supervisor.clone(),
        tts_service.clone(),
        library,
        playlists,
        resolver,
        settings,
        PlayerCommands {
            mp3_bin: config.mp3_player_bin.clone(),
            wav_bin: config.wav_player_bin.clone(),
            mixer_bin: config.mixer_bin.clone(),
        },
        config.playlist_loop,
        config.default_volume,
    );
    let (dispatcher, _worker) = CommandDispatcher::start(engine, exit_rx);

    // 5. Controllers
    tracing::info!("Instantiating controllers...");
    let tts_controller = Arc::new(TtsController::new(dispatcher.clone()));
    let status_controller = Arc::new(StatusController::new(dispatcher.clone()));
    let hc3_controller = Arc::new(Hc3Controller::new(dispatcher.clone()));

    // 6. Home-controller TCP channel
    if config.hc3_enabled {
        let host = config.hc3_host.clone();
        let port = config.hc3_port;
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            if let Err(e) = start_hc3_listener(host, port, dispatcher).await {
                tracing::error!(error = %e, "HC3 listener failed");
            }
        });
    }

    // Serve HTTP until a shutdown signal arrives, then release the
    // audio device before exiting.
    tokio::select! {
        result = start_http_server(
            config.clone(),
            tts_controller,
            status_controller,
            hc3_controller,
        ) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping playback");
            if let Err(e) = dispatcher.submit(Command::Stop, CommandOrigin::Internal).await {
                tracing::warn!(error = %e, "failed to stop playback on shutdown");
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
    {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "mediad=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "mediad=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
