//! Error translation for command handlers
//!
//! Every command body runs inside [`guarded`], which turns a failed body
//! into exactly one chat reply and never lets the error reach the dispatcher.

use std::future::Future;

use teloxide::types::{ChatId, MessageId};

use crate::chat::ChatClient;
use crate::error::{BotError, BotResult, ErrorCategory, UserMessage};

/// Run a command body and answer its failure in the chat
///
/// Rate limits are honored by sleeping for the signaled wait before the
/// reply goes out.
pub async fn guarded<C, F>(chat: &C, chat_id: ChatId, reply_to: MessageId, command: &str, body: F)
where
    C: ChatClient + ?Sized,
    F: Future<Output = BotResult<()>>,
{
    let err = match body.await {
        Ok(()) => return,
        Err(err) => err,
    };

    report(&err, chat_id, command);

    if let ErrorCategory::RateLimited(wait) = err.category() {
        tokio::time::sleep(wait).await;
    }

    if let Err(reply_err) = chat.reply(chat_id, reply_to, &err.user_message()).await {
        tracing::error!(
            chat_id = chat_id.0,
            command,
            "Failed to send error reply: {}",
            reply_err
        );
    }
}

/// Log a handler failure at a level matching its category
pub(crate) fn report(err: &BotError, chat_id: ChatId, command: &str) {
    match err.category() {
        ErrorCategory::RateLimited(wait) => tracing::warn!(
            chat_id = chat_id.0,
            command,
            wait_secs = wait.as_secs(),
            "Rate limited"
        ),
        ErrorCategory::Other => {
            tracing::error!(chat_id = chat_id.0, command, "Command failed: {:?}", err)
        }
        category => tracing::warn!(
            chat_id = chat_id.0,
            command,
            "Command failed ({:?}): {}",
            category,
            err
        ),
    }
}
