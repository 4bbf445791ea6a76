//! Chat messaging seam
//!
//! Handlers talk to Telegram through [`ChatClient`] so the playback flow can
//! run against a recording fake in tests.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::error::BotResult;

/// Reference to a sent message that can be edited later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The two chat operations handlers need
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Reply to `reply_to` in `chat_id`
    async fn reply(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        text: &str,
    ) -> BotResult<StatusMessage>;

    /// Replace the text of a message sent earlier
    async fn edit(&self, message: StatusMessage, text: &str) -> BotResult<()>;
}

#[async_trait]
impl ChatClient for Bot {
    async fn reply(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        text: &str,
    ) -> BotResult<StatusMessage> {
        let sent = self
            .send_message(chat_id, text)
            .reply_to_message_id(reply_to)
            .await?;
        Ok(StatusMessage {
            chat_id: sent.chat.id,
            message_id: sent.id,
        })
    }

    async fn edit(&self, message: StatusMessage, text: &str) -> BotResult<()> {
        self.edit_message_text(message.chat_id, message.message_id, text)
            .await?;
        Ok(())
    }
}
