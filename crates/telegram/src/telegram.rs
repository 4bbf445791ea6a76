use crate::commands;
use crate::types::Command;
use teloxide::{
    dispatching::UpdateHandler, prelude::*, types::Chat, utils::command::BotCommands,
};

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Whether playback commands are answered in this chat
pub fn is_group_chat(chat: &Chat) -> bool {
    chat.is_group() || chat.is_supergroup()
}

fn is_group(msg: Message) -> bool {
    is_group_chat(&msg.chat)
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    // Playback only makes sense where there is a group voice chat
    let group_commands = dptree::filter(is_group)
        .branch(case![Command::Play(query)].endpoint(commands::play))
        .branch(case![Command::Stop].endpoint(commands::stop));

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Status].endpoint(commands::status))
        .branch(group_commands);

    Update::filter_message().branch(command_handler)
}
