use std::time::Duration;

use media::{MediaError, VoiceError};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

use crate::constants::{emoji, messages, MAX_ERROR_TEXT_LEN};
use crate::utils;

/// Custom error type for telegram bot operations
#[derive(Debug, Error)]
pub enum BotError {
    /// Telegram API error
    #[error("Telegram error: {0}")]
    Telegram(#[from] RequestError),
    /// Search, download or file resolution error
    #[error(transparent)]
    Media(#[from] MediaError),
    /// Voice-call bridge error
    #[error(transparent)]
    Voice(#[from] VoiceError),
    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Failure categories the error translation layer knows how to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wait this long before talking to the platform again
    RateLimited(Duration),
    /// The bot or assistant lacks admin rights in the chat
    AdminRequired,
    /// No voice chat to act on
    NotInVoiceChat,
    /// The chat cannot be accessed
    ChannelPrivate,
    Other,
}

impl BotError {
    /// Classify this error for the user-facing reply
    pub fn category(&self) -> ErrorCategory {
        match self {
            BotError::Telegram(e) => telegram_category(e),
            BotError::Voice(e) => voice_category(e),
            BotError::Media(_) | BotError::Message(_) => ErrorCategory::Other,
        }
    }
}

fn telegram_category(err: &RequestError) -> ErrorCategory {
    match err {
        RequestError::RetryAfter(wait) => ErrorCategory::RateLimited(*wait),
        RequestError::Api(api) => match api {
            ApiError::NotEnoughRightsToPostMessages
            | ApiError::NotEnoughRightsToPinMessage
            | ApiError::NotEnoughRightsToRestrict => ErrorCategory::AdminRequired,
            ApiError::Unknown(raw) => {
                let raw = raw.to_ascii_uppercase();
                if raw.contains("CHAT_ADMIN_REQUIRED") || raw.contains("NOT ENOUGH RIGHTS") {
                    ErrorCategory::AdminRequired
                } else if raw.contains("CHANNEL_PRIVATE") || raw.contains("CHANNEL IS PRIVATE") {
                    ErrorCategory::ChannelPrivate
                } else {
                    ErrorCategory::Other
                }
            }
            _ => ErrorCategory::Other,
        },
        _ => ErrorCategory::Other,
    }
}

fn voice_category(err: &VoiceError) -> ErrorCategory {
    match err {
        VoiceError::FloodWait(secs) => ErrorCategory::RateLimited(Duration::from_secs(*secs)),
        VoiceError::AdminRequired => ErrorCategory::AdminRequired,
        VoiceError::NotInCall | VoiceError::NoActiveGroupCall => ErrorCategory::NotInVoiceChat,
        VoiceError::ChannelPrivate => ErrorCategory::ChannelPrivate,
        _ => ErrorCategory::Other,
    }
}

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to convert results into user-friendly messages
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for BotError {
    fn user_message(&self) -> String {
        match self.category() {
            ErrorCategory::RateLimited(wait) => format!(
                "{} Too many requests. Please wait {} seconds before trying again.",
                emoji::HOURGLASS,
                wait.as_secs()
            ),
            ErrorCategory::AdminRequired => messages::ADMIN_REQUIRED.to_string(),
            ErrorCategory::NotInVoiceChat => messages::JOIN_VOICE_CHAT.to_string(),
            ErrorCategory::ChannelPrivate => messages::CHANNEL_PRIVATE.to_string(),
            ErrorCategory::Other => match self {
                BotError::Media(MediaError::NoResults(query)) => {
                    format!("{} No results found for \"{}\".", emoji::ERROR, query)
                }
                BotError::Media(MediaError::FileNotFound(_)) => messages::FILE_NOT_FOUND.to_string(),
                other => format!(
                    "{} Error: {}",
                    emoji::WARNING,
                    utils::truncate_chars(&other.to_string(), MAX_ERROR_TEXT_LEN)
                ),
            },
        }
    }
}
