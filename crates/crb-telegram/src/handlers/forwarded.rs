use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ForwardedFrom, Message, ParseMode},
};

use crb_core::{domain::ChatId, registration::ChannelInfo};

use crate::router::AppState;

const HIDDEN_ORIGIN: &str = "⚠️ <b>Forward Origin Hidden</b>\n\n\
This message was forwarded from a hidden user, so the channel cannot be identified.\n\n\
Please forward a message directly from your channel.";

const ONLY_CHANNELS: &str = "⚠️ <b>Only Channels Supported</b>\n\n\
This bot registers Telegram channels, not groups or private chats.\n\n\
Please forward a message from your channel.";

const REGISTRATION_ERROR: &str = "❌ <b>Error Processing Message</b>\n\n\
There was an error processing the forwarded message.\n\n\
Please try:\n\
• Adding the bot to the channel as admin\n\
• Forwarding a message directly from the channel";

pub(super) async fn handle_forwarded(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(forward) = msg.forward() else {
        return Ok(());
    };

    match &forward.from {
        ForwardedFrom::SenderName(_) => {
            bot.send_message(msg.chat.id, HIDDEN_ORIGIN)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        ForwardedFrom::Chat(chat) if chat.is_channel() || chat.is_supergroup() => {
            let info = ChannelInfo {
                chat_id: ChatId(chat.id.0),
                title: chat.title().unwrap_or("Unknown").to_string(),
                username: chat.username().map(str::to_string),
            };
            match state.registrar.register_forwarded(&info).await {
                Ok(reply) => {
                    bot.send_message(msg.chat.id, reply)
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
                Err(err) => {
                    tracing::error!(chat_id = info.chat_id.0, error = %err, "forwarded registration failed");
                    bot.send_message(msg.chat.id, REGISTRATION_ERROR)
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
            }
        }
        ForwardedFrom::Chat(_) | ForwardedFrom::User(_) => {
            bot.send_message(msg.chat.id, ONLY_CHANNELS)
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }

    Ok(())
}
