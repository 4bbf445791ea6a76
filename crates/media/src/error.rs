use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from searching, downloading and locating audio files
#[derive(Debug, Error)]
pub enum MediaError {
    /// The search returned no entries
    #[error("No results found for \"{0}\"")]
    NoResults(String),
    /// Download reported success but no candidate file exists
    #[error("Audio file not found after download: {}", .0.display())]
    FileNotFound(PathBuf),
    /// The extractor binary could not be started
    #[error("Failed to start {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    /// The extractor ran but exited unsuccessfully
    #[error("yt-dlp exited with {status}: {stderr}")]
    Extractor { status: String, stderr: String },
    /// The extractor did not finish in time
    #[error("yt-dlp timed out after {0:?}")]
    Timeout(Duration),
    /// The extractor printed something that is not an info JSON line
    #[error("Invalid extractor output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the voice-call bridge
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The platform asked us to wait before joining again
    #[error("Flood wait of {0} seconds")]
    FloodWait(u64),
    #[error("Admin rights are required to manage the voice chat")]
    AdminRequired,
    /// There is no session for this chat to act on
    #[error("Not in a voice chat in this group")]
    NotInCall,
    /// The group has no voice chat running
    #[error("No active voice chat in this group")]
    NoActiveGroupCall,
    #[error("This channel is private")]
    ChannelPrivate,
    #[error("Already streaming in this chat")]
    AlreadyJoined,
    #[error("Voice bridge timed out after {0:?}")]
    Timeout(Duration),
    #[error("Failed to start voice bridge {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    /// Any other failure printed by the bridge
    #[error("Voice bridge failed: {0}")]
    Bridge(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoiceError {
    /// Map the error token a failed bridge printed on stderr onto a variant
    pub fn from_bridge_output(stderr: &str) -> Self {
        let stderr = stderr.trim();

        if let Some(seconds) = flood_wait_seconds(stderr) {
            return VoiceError::FloodWait(seconds);
        }
        if stderr.contains("CHAT_ADMIN_REQUIRED") {
            VoiceError::AdminRequired
        } else if stderr.contains("GROUPCALL_NOT_FOUND") {
            VoiceError::NoActiveGroupCall
        } else if stderr.contains("NOT_IN_CALL") {
            VoiceError::NotInCall
        } else if stderr.contains("CHANNEL_PRIVATE") {
            VoiceError::ChannelPrivate
        } else if stderr.is_empty() {
            VoiceError::Bridge("bridge exited without output".to_string())
        } else {
            VoiceError::Bridge(stderr.lines().last().unwrap_or(stderr).to_string())
        }
    }
}

/// Parse `FLOOD_WAIT_<n>` out of bridge output
fn flood_wait_seconds(text: &str) -> Option<u64> {
    const TOKEN: &str = "FLOOD_WAIT_";
    let start = text.find(TOKEN)? + TOKEN.len();
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
