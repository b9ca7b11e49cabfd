//! Telegram update handlers.
//!
//! Every operator-facing entry point checks the admin allow-list before any
//! work happens. Channel-membership updates are exempt: they arrive from
//! channels, not operators.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatMemberUpdated, Message},
};

use crate::router::AppState;

mod callback;
mod chat_member;
mod commands;
mod forwarded;
mod menu;

pub(crate) const NOT_AUTHORIZED: &str =
    "❌ You cannot use this bot. Only admins are allowed.";

pub(crate) fn is_admin(user_id: Option<u64>, admin_ids: &[i64]) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    admin_ids.contains(&(user_id as i64))
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let user_id = msg.from().map(|u| u.id.0);
    if !is_admin(user_id, &state.cfg.admin_ids) {
        let _ = bot.send_message(msg.chat.id, NOT_AUTHORIZED).await;
        return Ok(());
    }

    if msg.text().map(|t| t.starts_with('/')).unwrap_or(false) {
        return commands::handle_command(bot, msg, state).await;
    }

    if msg.forward().is_some() {
        return forwarded::handle_forwarded(bot, msg, state).await;
    }

    // Anything else (plain chatter, stickers, ...) is ignored.
    Ok(())
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_my_chat_member(
    bot: Bot,
    upd: ChatMemberUpdated,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    chat_member::handle_my_chat_member(bot, upd, state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_check() {
        let admins = vec![111, 222];
        assert!(is_admin(Some(111), &admins));
        assert!(!is_admin(Some(333), &admins));
        assert!(!is_admin(None, &admins));
        assert!(!is_admin(Some(111), &[]));
    }
}
