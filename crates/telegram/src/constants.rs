//! Constants used throughout the telegram bot

/// Longest error text shown to users for unclassified failures
pub const MAX_ERROR_TEXT_LEN: usize = 100;

/// Emoji constants for consistent UI
pub mod emoji {
    pub const SUCCESS: &str = "✅";
    pub const ERROR: &str = "❌";
    pub const WARNING: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const SEARCH: &str = "🔍";
    pub const HEADPHONES: &str = "🎧";
    pub const NOTES: &str = "🎶";
    pub const STOP: &str = "⏹️";
    pub const HOURGLASS: &str = "⏳";
    pub const BOT: &str = "🤖";
    pub const MIC: &str = "🎙";
    pub const CLOCK: &str = "⏱";
}

/// Fixed replies
pub mod messages {
    pub const PLAY_USAGE: &str = "❌ Please provide a song name to play!\n\nUsage: /play <song name>";
    pub const SEARCHING: &str = "🔍 Searching for the song...";
    pub const JOINING: &str = "🎧 Download complete! Joining voice chat...";
    pub const STOPPED: &str = "⏹️ Music stopped and left VC.";
    pub const NOTHING_PLAYING: &str = "ℹ️ Nothing is playing in this chat.";
    pub const VOICE_UNAVAILABLE: &str =
        "❌ Voice chat playback is unavailable right now. Check /status and try again later.";
    pub const ADMIN_REQUIRED: &str =
        "❌ I need admin rights here. Promote me and the assistant account to admin with \"Manage Voice Chats\".";
    pub const JOIN_VOICE_CHAT: &str = "❌ Please start or join the voice chat first!";
    pub const CHANNEL_PRIVATE: &str = "❌ I can't access this chat. It is private.";
    pub const FILE_NOT_FOUND: &str = "❌ Audio file not found after download.";
}
