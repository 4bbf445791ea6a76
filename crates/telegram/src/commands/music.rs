//! Voice chat playback commands (play, stop)

use teloxide::prelude::*;

use crate::handlers::guarded;
use crate::playback::{self, PlaybackRequest};
use crate::types::{AppContext, HandlerResult};
use crate::utils;

/// Search for a song and stream it into the group's voice chat
pub async fn play(bot: Bot, msg: Message, ctx: AppContext, query: String) -> HandlerResult {
    let req = PlaybackRequest {
        chat_id: msg.chat.id,
        reply_to: msg.id,
        query: utils::normalize_query(&query),
    };
    tracing::info!(chat_id = msg.chat.id.0, "/play {:?}", req.query);

    guarded(
        &bot,
        msg.chat.id,
        msg.id,
        "play",
        playback::play(&bot, &ctx, req),
    )
    .await;
    Ok(())
}

/// Stop playback and leave the group's voice chat
pub async fn stop(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    tracing::info!(chat_id = msg.chat.id.0, "/stop");

    guarded(
        &bot,
        msg.chat.id,
        msg.id,
        "stop",
        playback::stop(&bot, &ctx, msg.chat.id, msg.id),
    )
    .await;
    Ok(())
}
