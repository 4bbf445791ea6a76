//! Configuration loaded from environment variables

use std::path::PathBuf;

use media::BridgeCredentials;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_YTDLP_BIN: &str = "yt-dlp";
pub const DEFAULT_VOICE_BRIDGE_BIN: &str = "tgcalls-bridge";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Complete bot configuration
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub api_id: i32,
    pub api_hash: String,
    /// Pre-authorized session of the user account that joins voice chats
    pub session_string: String,
    /// Liveness HTTP port
    pub port: u16,
    pub download_dir: PathBuf,
    pub ytdlp_bin: String,
    pub voice_bridge_bin: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let api_id = required("API_ID")?
            .parse::<i32>()
            .map_err(|e| ConfigError::Invalid {
                name: "API_ID",
                reason: e.to_string(),
            })?;

        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            bot_token: required("BOT_TOKEN")?,
            api_id,
            api_hash: required("API_HASH")?,
            session_string: required("SESSION_STRING")?,
            port,
            download_dir: PathBuf::from(optional("DOWNLOAD_DIR", DEFAULT_DOWNLOAD_DIR)),
            ytdlp_bin: optional("YTDLP_BIN", DEFAULT_YTDLP_BIN),
            voice_bridge_bin: optional("VOICE_BRIDGE_BIN", DEFAULT_VOICE_BRIDGE_BIN),
        })
    }

    /// Credentials handed to the voice-call bridge
    pub fn bridge_credentials(&self) -> BridgeCredentials {
        BridgeCredentials {
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            session_string: self.session_string.clone(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_id", &self.api_id)
            .field("port", &self.port)
            .field("download_dir", &self.download_dir)
            .field("ytdlp_bin", &self.ytdlp_bin)
            .field("voice_bridge_bin", &self.voice_bridge_bin)
            .finish_non_exhaustive()
    }
}
