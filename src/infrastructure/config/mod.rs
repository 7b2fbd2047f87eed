use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    // HC3 command channel
    pub hc3_enabled: bool,
    pub hc3_host: String,
    pub hc3_port: u16,
    // Audio library
    pub music_dir: PathBuf,
    pub playlists_dir: PathBuf,
    pub tts_cache_dir: PathBuf,
    pub state_dir: PathBuf,
    pub default_volume: u8,
    pub playlist_loop: bool,
    // TTS
    pub tts_backend: TtsBackendKind,
    pub tts_default_voice: String,
    pub tts_cache_capacity: u64,
    pub synthesis_timeout_secs: u64,
    // Stream resolution
    pub resolver_timeout_secs: u64,
    // Process supervision
    pub terminate_grace_ms: u64,
    // External binaries
    pub mp3_player_bin: String,
    pub wav_player_bin: String,
    pub espeak_bin: String,
    pub text2wave_bin: String,
    pub ytdlp_bin: String,
    pub mixer_bin: Option<String>,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackendKind {
    Espeak,
    Festival,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            hc3_enabled: env::var("HC3_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            hc3_host: env::var("HC3_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            hc3_port: env::var("HC3_PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()?,
            music_dir: env::var("MUSIC_DIR")
                .unwrap_or_else(|_| "./audio/music".to_string())
                .into(),
            playlists_dir: env::var("PLAYLISTS_DIR")
                .unwrap_or_else(|_| "./audio/playlists".to_string())
                .into(),
            tts_cache_dir: env::var("TTS_CACHE_DIR")
                .unwrap_or_else(|_| "./audio/tts_cache".to_string())
                .into(),
            state_dir: env::var("STATE_DIR")
                .unwrap_or_else(|_| "./state".to_string())
                .into(),
            default_volume: env::var("DEFAULT_VOLUME")
                .unwrap_or_else(|_| "50".to_string())
                .parse()?,
            playlist_loop: env::var("PLAYLIST_LOOP")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                == "true",
            tts_backend: match env::var("TTS_BACKEND")
                .unwrap_or_else(|_| "espeak".to_string())
                .to_lowercase()
                .as_str()
            {
                "festival" => TtsBackendKind::Festival,
                _ => TtsBackendKind::Espeak,
            },
            tts_default_voice: env::var("TTS_DEFAULT_VOICE")
                .unwrap_or_else(|_| "default".to_string()),
            tts_cache_capacity: env::var("TTS_CACHE_CAPACITY")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            synthesis_timeout_secs: env::var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            resolver_timeout_secs: env::var("RESOLVER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            terminate_grace_ms: env::var("TERMINATE_GRACE_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            mp3_player_bin: env::var("MP3_PLAYER_BIN").unwrap_or_else(|_| "mpg123".to_string()),
            wav_player_bin: env::var("WAV_PLAYER_BIN").unwrap_or_else(|_| "aplay".to_string()),
            espeak_bin: env::var("ESPEAK_BIN").unwrap_or_else(|_| "espeak".to_string()),
            text2wave_bin: env::var("TEXT2WAVE_BIN").unwrap_or_else(|_| "text2wave".to_string()),
            ytdlp_bin: env::var("YTDLP_BIN").unwrap_or_else(|_| "yt-dlp".to_string()),
            mixer_bin: env::var("MIXER_BIN").ok().filter(|s| !s.is_empty()),
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
        };

        Ok(config)
    }

    /// Create the directories the daemon writes to
    pub fn create_directories(&self) -> std::io::Result<()> {
        for dir in [
            &self.music_dir,
            &self.playlists_dir,
            &self.tts_cache_dir,
            &self.state_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
