//! Informational commands (start, status)

use teloxide::prelude::*;

use crate::chat::ChatClient;
use crate::constants::emoji;
use crate::handlers::guarded;
use crate::types::{AppContext, HandlerResult, SystemStatus};
use crate::utils;

/// Usage summary followed by the status lines
pub fn start_text(status: &SystemStatus) -> String {
    format!(
        "👋 Hi! I play music in group voice chats.\n\n\
        🎯 Commands:\n\
        • /play <song name> - Search and stream a song\n\
        • /stop - Stop playback and leave the voice chat\n\
        • /status - Show bot status\n\n\
        Start a voice chat in your group, then use /play.\n\n{}",
        status_text(status)
    )
}

pub fn status_text(status: &SystemStatus) -> String {
    let voice = if status.voice_available {
        "connected"
    } else {
        "unavailable"
    };
    format!(
        "{} Bot: running\n{} Voice calls: {}\n{} Up since: {}",
        emoji::BOT,
        emoji::MIC,
        voice,
        emoji::CLOCK,
        utils::format_timestamp(status.started_at.timestamp())
    )
}

/// Welcome message when user starts the bot
pub async fn start(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let text = start_text(&ctx.status);
    guarded(&bot, msg.chat.id, msg.id, "start", async {
        bot.reply(msg.chat.id, msg.id, &text).await.map(|_| ())
    })
    .await;
    Ok(())
}

/// Report which subsystems are up
pub async fn status(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let text = status_text(&ctx.status);
    guarded(&bot, msg.chat.id, msg.id, "status", async {
        bot.reply(msg.chat.id, msg.id, &text).await.map(|_| ())
    })
    .await;
    Ok(())
}
