use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ChatMemberKind, ChatMemberUpdated, ParseMode},
};

use crb_core::{domain::ChatId, registration::ChannelInfo};

use crate::router::AppState;

/// Registers a channel when the bot is added to it as admin or member.
pub(super) async fn handle_my_chat_member(
    bot: Bot,
    upd: ChatMemberUpdated,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    if !(upd.chat.is_channel() || upd.chat.is_supergroup()) {
        return Ok(());
    }

    let joined = matches!(
        upd.new_chat_member.kind,
        ChatMemberKind::Administrator(_) | ChatMemberKind::Member
    );
    if !joined {
        return Ok(());
    }

    let info = ChannelInfo {
        chat_id: ChatId(upd.chat.id.0),
        title: upd.chat.title().unwrap_or("Unknown").to_string(),
        username: upd.chat.username().map(str::to_string),
    };

    match state.registrar.register_added(&info).await {
        Ok(confirmation) => {
            // Confirm to whoever added the bot. Best-effort: they may never
            // have opened a private chat with the bot.
            let user_chat = teloxide::types::ChatId(upd.from.id.0 as i64);
            let _ = bot
                .send_message(user_chat, confirmation)
                .parse_mode(ParseMode::Html)
                .await;
        }
        Err(err) => {
            tracing::error!(chat_id = info.chat_id.0, error = %err, "channel registration failed");
        }
    }

    Ok(())
}
