use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mediad::controllers::{hc3::Hc3Controller, status::StatusController, tts::TtsController};
use mediad::domain::command::CommandDispatcher;
use mediad::domain::playback::{PlaybackEngine, PlayerCommands};
use mediad::domain::tts::TtsService;
use mediad::infrastructure::hc3::run_hc3_listener;
use mediad::infrastructure::http::build_router;
use mediad::infrastructure::process::ProcessSupervisor;
use mediad::infrastructure::repositories::{
    ArtifactRepository, MediaLibrary, PlaylistRepository, SettingsRepository, StreamResolver,
    TtsBackend, TtsBackendError,
};
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod hc3_client;

use api_client::TestClient;
use hc3_client::Hc3Client;

/// Synthesis backend that writes a fake WAV instantly. Keeps the suite
/// independent of espeak/festival being installed.
struct StubTtsBackend;

#[async_trait]
impl TtsBackend for StubTtsBackend {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &str,
        _speed: f32,
        _volume: f32,
        out_path: &Path,
    ) -> Result<(), TtsBackendError> {
        tokio::fs::write(out_path, b"RIFFstub")
            .await
            .map_err(|e| TtsBackendError::Failed(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub hc3_addr: SocketAddr,
    root: tempfile::TempDir,
}

impl TestContext {
    /// Drop a fake mp3 into the media library.
    pub fn add_track(&self, name: &str) {
        std::fs::write(
            self.root.path().join("music").join(format!("{name}.mp3")),
            b"ID3fake",
        )
        .expect("write track");
    }

    pub fn add_playlist(&self, name: &str, songs: &[&str]) {
        let body = serde_json::json!({ "songs": songs });
        std::fs::write(
            self.root
                .path()
                .join("playlists")
                .join(format!("{name}.json")),
            body.to_string(),
        )
        .expect("write playlist");
    }

    pub async fn hc3(&self) -> Hc3Client {
        Hc3Client::connect(self.hc3_addr).await
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let root = tempfile::tempdir().expect("create temp root");
            for sub in ["music", "playlists", "cache", "state", "bin"] {
                std::fs::create_dir(root.path().join(sub)).expect("create dir");
            }
            let bin = root.path().join("bin");

            // Stand-ins for mpg123/aplay and yt-dlp. Music playback
            // runs until terminated; speech (WAV) finishes after a
            // second so resume-after-speech is observable.
            let mp3_player = write_script(&bin, "mp3_player.sh", "#!/bin/sh\nsleep 30\n");
            let wav_player = write_script(&bin, "wav_player.sh", "#!/bin/sh\nsleep 1\n");
            let resolver_bin = write_script(
                &bin,
                "resolver.sh",
                "#!/bin/sh\necho \"Test Stream Title\"\necho \"https://example.com/stream.mp3\"\n",
            );

            let (supervisor, exit_rx) = ProcessSupervisor::new(Duration::from_millis(300));

            let artifacts = Arc::new(ArtifactRepository::new(root.path().join("cache")));
            let tts_service = Arc::new(TtsService::new(
                Arc::new(StubTtsBackend),
                artifacts,
                100,
                "default".to_string(),
            ));
            let library = Arc::new(MediaLibrary::new(root.path().join("music")));
            let playlists = Arc::new(PlaylistRepository::new(root.path().join("playlists")));
            let resolver = Arc::new(StreamResolver::new(
                supervisor.clone(),
                resolver_bin,
                Duration::from_secs(5),
            ));
            let settings = Arc::new(SettingsRepository::new(root.path().join("state")));

            let engine = PlaybackEngine::new(
                supervisor,
                tts_service,
                library,
                playlists,
                resolver,
                settings,
                PlayerCommands {
                    mp3_bin: mp3_player,
                    wav_bin: wav_player,
                    mixer_bin: None,
                },
                false,
                50,
            );
            let (dispatcher, _worker) = CommandDispatcher::start(engine, exit_rx);

            let tts_controller = Arc::new(TtsController::new(dispatcher.clone()));
            let status_controller = Arc::new(StatusController::new(dispatcher.clone()));
            let hc3_controller = Arc::new(Hc3Controller::new(dispatcher.clone()));

            let app = build_router(tts_controller, status_controller, hc3_controller);

            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind HTTP listener");
            let addr = listener.local_addr().expect("local addr");
            let base_url = format!("http://{addr}");
            tokio::spawn(async move {
                axum::serve(listener, app).await.expect("serve");
            });

            let hc3_listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind HC3 listener");
            let hc3_addr = hc3_listener.local_addr().expect("HC3 local addr");
            tokio::spawn(run_hc3_listener(hc3_listener, dispatcher));

            let client = TestClient::new(&base_url);

            Self {
                client,
                hc3_addr,
                root,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Stub players die with the supervisor's kill_on_drop
            // handles when the runtime shuts down.
        }
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path.display().to_string()
}
