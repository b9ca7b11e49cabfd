//! Inline-keyboard main menu and its views.

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use crb_core::{moderation::NO_CHANNELS, roster, store::MemberGrowth};

use crate::router::AppState;

pub(super) const CB_HOW_TO_USE: &str = "how_to_use";
pub(super) const CB_LIST: &str = "list_channels";
pub(super) const CB_STATS: &str = "stats";
pub(super) const CB_BACK: &str = "back_to_main";

pub(super) const MAIN_MENU_TEXT: &str = "🤖 Channel Registration Bot";

pub(super) const HELP_TEXT: &str = "📖 <b>How to Use Guide</b>\n\n\
What this bot does:\n\
✅ Automatically registers Telegram channels\n\
✅ Tracks channel member counts\n\
🔨 Bans users from all channels\n\
📢 Broadcasts messages to all channels\n\
🗑 Deletes broadcasted messages\n\n\
<b>Registration methods:</b>\n\n\
Method 1 - add the bot to a channel:\n\
• Open your channel info\n\
• Add this bot as administrator\n\n\
Method 2 - forward a message:\n\
• Forward any message from your channel to this bot\n\n\
<b>Commands:</b>\n\
/ban - ban a user from all registered channels\n\
/unban - unban a user in all registered channels\n\
/broadcast - reply to a message to broadcast it\n\
/del - delete a broadcast\n\
/list - list all registered channels\n\
/stats - show bot statistics\n\n\
Note: the bot needs admin rights to read member counts.";

pub(super) fn main_menu_markup() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📖 How to Use", CB_HOW_TO_USE)],
        vec![InlineKeyboardButton::callback("📋 Channel List", CB_LIST)],
        vec![InlineKeyboardButton::callback("📊 Statistics", CB_STATS)],
    ])
}

pub(super) fn back_markup() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback("🔙 Back", CB_BACK)]])
}

pub(super) async fn send_main_menu(bot: &Bot, chat: teloxide::types::ChatId) -> ResponseResult<()> {
    bot.send_message(chat, MAIN_MENU_TEXT)
        .reply_markup(main_menu_markup())
        .await?;
    Ok(())
}

pub(super) async fn send_help(bot: &Bot, chat: teloxide::types::ChatId) -> ResponseResult<()> {
    bot.send_message(chat, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .reply_markup(back_markup())
        .await?;
    Ok(())
}

pub(super) async fn channel_list_view(state: &AppState) -> (String, InlineKeyboardMarkup) {
    let markup = back_markup();

    let channels = match state.store.list_active().await {
        Ok(channels) => channels,
        Err(err) => {
            tracing::error!(error = %err, "channel list failed");
            return ("❌ Error loading channel list.".to_string(), markup);
        }
    };
    if channels.is_empty() {
        return (NO_CHANNELS.to_string(), markup);
    }

    let mut entries = Vec::with_capacity(channels.len());
    for rec in channels {
        let growth = state
            .store
            .member_growth_today(rec.chat_id)
            .await
            .unwrap_or(MemberGrowth::NoData);
        entries.push((rec, growth));
    }

    (roster::render_channel_list(&entries), markup)
}

pub(super) async fn stats_view(state: &AppState) -> (String, InlineKeyboardMarkup) {
    match state.store.stats().await {
        Ok(stats) => (
            roster::render_stats(&stats, chrono::Utc::now()),
            back_markup(),
        ),
        Err(err) => {
            tracing::error!(error = %err, "stats failed");
            ("❌ Error loading statistics.".to_string(), back_markup())
        }
    }
}
