use std::sync::Arc;

use chrono::{DateTime, Utc};
use media::{Extractor, ScratchDir, VoiceCalls};
use teloxide::macros::BotCommands;

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Show usage and bot status")]
    Start,
    #[command(description = "Show subsystem status")]
    Status,
    #[command(description = "Play a song in the voice chat: /play <song name>")]
    Play(String),
    #[command(description = "Stop playback and leave the voice chat")]
    Stop,
}

/// Facts computed once at startup and never changed afterwards
#[derive(Debug, Clone, Copy)]
pub struct SystemStatus {
    /// Whether the voice-call bridge passed its startup check
    pub voice_available: bool,
    pub started_at: DateTime<Utc>,
}

/// Dependencies shared by every handler
#[derive(Clone)]
pub struct AppContext {
    pub extractor: Arc<dyn Extractor>,
    pub voice: Arc<dyn VoiceCalls>,
    pub scratch: ScratchDir,
    pub status: SystemStatus,
}
