use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use crate::router::AppState;

use super::menu;

pub(super) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    // Acknowledge early so the button spinner stops.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let message_id = message.id;
    let data = q.data.clone().unwrap_or_default();

    if !super::is_admin(Some(q.from.id.0), &state.cfg.admin_ids) {
        let _ = bot
            .edit_message_text(chat_id, message_id, super::NOT_AUTHORIZED)
            .await;
        return Ok(());
    }

    let (text, markup) = match data.as_str() {
        menu::CB_HOW_TO_USE => (menu::HELP_TEXT.to_string(), menu::back_markup()),
        menu::CB_LIST => menu::channel_list_view(&state).await,
        menu::CB_STATS => menu::stats_view(&state).await,
        menu::CB_BACK => (menu::MAIN_MENU_TEXT.to_string(), menu::main_menu_markup()),
        _ => return Ok(()),
    };

    let _ = bot
        .edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(markup)
        .await;

    Ok(())
}
