pub mod chat;
pub mod commands;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod playback;
pub mod telegram;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::{ChatClient, StatusMessage};
pub use error::{BotError, BotResult, ErrorCategory, UserMessage};
pub use teloxide::prelude::Dispatcher;
pub use types::{AppContext, Command, HandlerResult, SystemStatus};
