//! Voice-call client
//!
//! Group calls are handled by an external bridge program logged in with the
//! user session. Each active call is one bridge child process:
//!
//! ```text
//! <bridge> join --chat-id <id> --input <file> --bitrate <bps> --channels <n>
//! ```
//!
//! The bridge prints `JOINED` on stdout once audio is flowing and keeps
//! running until killed. On failure it exits non-zero with an error token
//! on stderr (see [`VoiceError::from_bridge_output`]).

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::error::VoiceError;
use crate::utils;

/// Line the bridge prints once it is streaming
const JOINED_MARKER: &str = "JOINED";

/// Default time allowed between spawning the bridge and `JOINED`
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Audio encoding parameters for the outgoing stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioParameters {
    pub bitrate: u32,
    pub channels: u8,
}

impl AudioParameters {
    /// 48 kHz stereo
    pub const HIGH_QUALITY: Self = Self {
        bitrate: 48_000,
        channels: 2,
    };
}

impl Default for AudioParameters {
    fn default() -> Self {
        Self::HIGH_QUALITY
    }
}

/// Group voice-call service, one session per chat
#[async_trait]
pub trait VoiceCalls: Send + Sync {
    /// Join the chat's voice call and stream `input`
    async fn join(
        &self,
        chat_id: i64,
        input: &Path,
        params: AudioParameters,
    ) -> Result<(), VoiceError>;

    /// Leave the chat's voice call
    ///
    /// Fails with [`VoiceError::NotInCall`] when there is no session.
    async fn leave(&self, chat_id: i64) -> Result<(), VoiceError>;
}

/// Credentials the bridge logs in with
#[derive(Clone)]
pub struct BridgeCredentials {
    pub api_id: i32,
    pub api_hash: String,
    pub session_string: String,
}

impl std::fmt::Debug for BridgeCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeCredentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("session_string", &"<redacted>")
            .finish()
    }
}

/// Voice-call client backed by bridge child processes
#[derive(Clone)]
pub struct VoiceBridge {
    program: String,
    leading_args: Vec<String>,
    credentials: BridgeCredentials,
    sessions: Arc<Mutex<HashMap<i64, Child>>>,
    join_timeout: Duration,
}

impl VoiceBridge {
    /// Create a client for the given bridge command line
    pub fn new(command: &str, credentials: BridgeCredentials) -> Self {
        let (program, leading_args) = utils::split_command(command)
            .unwrap_or_else(|| ("tgcalls-bridge".to_string(), Vec::new()));
        Self {
            program,
            leading_args,
            credentials,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            join_timeout: JOIN_TIMEOUT,
        }
    }

    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .env("API_ID", self.credentials.api_id.to_string())
            .env("API_HASH", &self.credentials.api_hash)
            .env("SESSION_STRING", &self.credentials.session_string)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> VoiceError {
        VoiceError::Spawn {
            bin: self.program.clone(),
            source,
        }
    }

    /// Check that the bridge can be run at all
    ///
    /// Called once at startup; the result decides whether voice playback is
    /// offered.
    pub async fn start(&self) -> Result<String, VoiceError> {
        let output = timeout(self.join_timeout, self.command().arg("--version").output())
            .await
            .map_err(|_| VoiceError::Timeout(self.join_timeout))?
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(VoiceError::from_bridge_output(&String::from_utf8_lossy(
                &output.stderr,
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::info!("Voice bridge ready: {} {}", self.program, version);
        Ok(version)
    }

    /// Start a bridge for `chat_id` and wait until it reports `JOINED`
    async fn spawn_joined(
        &self,
        chat_id: i64,
        input: &Path,
        params: AudioParameters,
    ) -> Result<Child, VoiceError> {
        let mut child = self
            .command()
            .arg("join")
            .arg("--chat-id")
            .arg(chat_id.to_string())
            .arg("--input")
            .arg(input)
            .arg("--bitrate")
            .arg(params.bitrate.to_string())
            .arg("--channels")
            .arg(params.channels.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VoiceError::Bridge("bridge stdout unavailable".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let joined = timeout(self.join_timeout, async {
            while let Some(line) = lines.next_line().await? {
                if line.trim() == JOINED_MARKER {
                    return Ok(true);
                }
                tracing::debug!(chat_id, "voice bridge: {}", line);
            }
            Ok::<bool, std::io::Error>(false)
        })
        .await;

        match joined {
            Ok(Ok(true)) => {
                tokio::spawn(drain_lines(chat_id, lines));
                if let Some(stderr) = child.stderr.take() {
                    tokio::spawn(drain_lines(chat_id, BufReader::new(stderr).lines()));
                }
                Ok(child)
            }
            Ok(Ok(false)) => {
                // stdout closed without JOINED: the bridge is exiting
                let output = child.wait_with_output().await?;
                let err = VoiceError::from_bridge_output(&String::from_utf8_lossy(&output.stderr));
                tracing::warn!(chat_id, "Voice bridge failed to join: {}", err);
                Err(err)
            }
            Ok(Err(e)) => {
                let _ = child.kill().await;
                Err(e.into())
            }
            Err(_) => {
                let _ = child.kill().await;
                Err(VoiceError::Timeout(self.join_timeout))
            }
        }
    }

    /// Number of chats with a bridge process registered
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl VoiceCalls for VoiceBridge {
    async fn join(
        &self,
        chat_id: i64,
        input: &Path,
        params: AudioParameters,
    ) -> Result<(), VoiceError> {
        {
            let mut sessions = self.sessions.lock().await;
            if let Some(existing) = sessions.get_mut(&chat_id) {
                if existing.try_wait()?.is_none() {
                    return Err(VoiceError::AlreadyJoined);
                }
                sessions.remove(&chat_id);
            }
        }

        // the lock is not held while the bridge connects
        let mut child = self.spawn_joined(chat_id, input, params).await?;

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&chat_id) {
            drop(sessions);
            let _ = child.kill().await;
            return Err(VoiceError::AlreadyJoined);
        }
        sessions.insert(chat_id, child);
        tracing::info!(chat_id, "Joined voice chat streaming {}", input.display());
        Ok(())
    }

    async fn leave(&self, chat_id: i64) -> Result<(), VoiceError> {
        let child = self.sessions.lock().await.remove(&chat_id);
        let Some(mut child) = child else {
            return Err(VoiceError::NotInCall);
        };

        if child.try_wait()?.is_none() {
            child.kill().await?;
        }
        tracing::info!(chat_id, "Left voice chat");
        Ok(())
    }
}

/// Forward whatever the bridge prints after joining to the debug log
async fn drain_lines<R>(chat_id: i64, mut lines: tokio::io::Lines<BufReader<R>>)
where
    R: AsyncRead + Unpin,
{
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(chat_id, "voice bridge: {}", line);
    }
}
