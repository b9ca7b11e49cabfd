use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{Message, ParseMode},
};

use crb_core::{
    broadcast::BROADCAST_NOT_FOUND,
    domain::{ChatId, MessageId, MessageRef},
    ports::{BroadcastContent, StatusMessage},
};

use crate::{router::AppState, TelegramStatusMessage};

use super::menu;

const BAN_USAGE: &str = "🔨 <b>Ban Command Usage</b>\n\n\
<code>/ban user_id</code> - ban a user from all registered channels.\n\n\
Example:\n<code>/ban 123456789</code>\n\n\
Note: the bot must be admin in every channel with ban permissions.";

const UNBAN_USAGE: &str = "🔓 <b>Unban Command Usage</b>\n\n\
<code>/unban user_id</code> - unban a user in all registered channels.\n\n\
Example:\n<code>/unban 123456789</code>\n\n\
Note: the bot must be admin in every channel with unban permissions.";

const BROADCAST_USAGE: &str = "📢 <b>Broadcast Usage</b>\n\n\
Reply to a message with /broadcast to send it to all registered channels.\n\n\
1. Send your message in any chat\n\
2. Reply to that message with /broadcast\n\
3. The message is sent to all channels\n\n\
Note: formatting is preserved exactly as you sent it.";

const DELETE_USAGE: &str = "🗑 <b>Delete Broadcast Usage</b>\n\n\
<code>/del broadcast_id</code> - delete a broadcast from all channels.\n\n\
Example:\n<code>/del broadcast_123456789</code>\n\n\
The broadcast ID is shown in the broadcast completion message.";

const UNSUPPORTED_CONTENT: &str =
    "❌ Unsupported message type. Text, photos, videos and documents can be broadcast.";

pub(super) fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub(super) async fn handle_command(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let (cmd, args) = parse_command(msg.text().unwrap_or(""));

    match cmd.as_str() {
        "start" => menu::send_main_menu(&bot, msg.chat.id).await,
        "help" => menu::send_help(&bot, msg.chat.id).await,
        "list" => {
            let (text, markup) = menu::channel_list_view(&state).await;
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(markup)
                .await?;
            Ok(())
        }
        "stats" => {
            let (text, markup) = menu::stats_view(&state).await;
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(markup)
                .await?;
            Ok(())
        }
        "ban" => run_ban(&bot, &msg, &state, &args).await,
        "unban" => run_unban(&bot, &msg, &state, &args).await,
        "broadcast" => run_broadcast(&bot, &msg, &state).await,
        "del" => run_delete(&bot, &msg, &state, &args).await,
        _ => Ok(()),
    }
}

async fn run_ban(bot: &Bot, msg: &Message, state: &AppState, args: &str) -> ResponseResult<()> {
    if args.is_empty() {
        bot.send_message(msg.chat.id, BAN_USAGE)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    match state.moderator.ban_all(args).await {
        Ok(report) => {
            bot.send_message(msg.chat.id, report)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Err(err) => {
            tracing::error!(error = %err, "ban operation failed");
            bot.send_message(msg.chat.id, "❌ Error performing ban operation.")
                .await?;
        }
    }
    Ok(())
}

async fn run_unban(bot: &Bot, msg: &Message, state: &AppState, args: &str) -> ResponseResult<()> {
    if args.is_empty() {
        bot.send_message(msg.chat.id, UNBAN_USAGE)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    match state.moderator.unban_all(args).await {
        Ok(report) => {
            bot.send_message(msg.chat.id, report)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Err(err) => {
            tracing::error!(error = %err, "unban operation failed");
            bot.send_message(msg.chat.id, "❌ Error performing unban operation.")
                .await?;
        }
    }
    Ok(())
}

async fn run_broadcast(bot: &Bot, msg: &Message, state: &AppState) -> ResponseResult<()> {
    let Some(reply) = msg.reply_to_message() else {
        bot.send_message(msg.chat.id, BROADCAST_USAGE)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    };

    let Some(content) = extract_content(reply) else {
        bot.send_message(msg.chat.id, UNSUPPORTED_CONTENT).await?;
        return Ok(());
    };

    let status_msg = bot
        .send_message(msg.chat.id, "🔄 Starting broadcast...")
        .await?;
    let status = TelegramStatusMessage::new(
        bot.clone(),
        MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(status_msg.id.0),
        },
    );

    match state
        .broadcaster
        .broadcast(&content, MessageId(msg.id.0), &status)
        .await
    {
        Ok(report) => {
            let _ = status.edit(&report).await;
        }
        Err(err) => {
            tracing::error!(error = %err, "broadcast operation failed");
            let _ = status.edit("❌ Error during broadcast operation.").await;
        }
    }
    Ok(())
}

async fn run_delete(bot: &Bot, msg: &Message, state: &AppState, args: &str) -> ResponseResult<()> {
    if args.is_empty() {
        bot.send_message(msg.chat.id, DELETE_USAGE)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    let broadcast_id = args.split_whitespace().next().unwrap_or(args);
    if !state.broadcaster.contains(broadcast_id).await {
        bot.send_message(msg.chat.id, BROADCAST_NOT_FOUND).await?;
        return Ok(());
    }

    let status_msg = bot
        .send_message(msg.chat.id, "🔄 Starting deletion...")
        .await?;
    let status = TelegramStatusMessage::new(
        bot.clone(),
        MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(status_msg.id.0),
        },
    );

    match state.broadcaster.delete_broadcast(broadcast_id, &status).await {
        Ok(report) => {
            let _ = status.edit(&report).await;
        }
        Err(err) => {
            tracing::error!(error = %err, "delete operation failed");
            let _ = status.edit("❌ Error during deletion operation.").await;
        }
    }
    Ok(())
}

/// Pull a re-sendable copy out of the replied-to message.
///
/// Mirrors what the remote API can deliver to a channel: text, photo, video
/// or document, caption preserved. A caption without known media falls back
/// to plain text.
fn extract_content(msg: &Message) -> Option<BroadcastContent> {
    if let Some(text) = msg.text() {
        return Some(BroadcastContent::Text {
            text: text.to_string(),
        });
    }

    let caption = msg.caption().map(|c| c.to_string());

    if let Some(photos) = msg.photo() {
        // Telegram lists photo sizes smallest first; take the largest.
        if let Some(best) = photos.last() {
            return Some(BroadcastContent::Photo {
                file_id: best.file.id.clone(),
                caption,
            });
        }
    }
    if let Some(video) = msg.video() {
        return Some(BroadcastContent::Video {
            file_id: video.file.id.clone(),
            caption,
        });
    }
    if let Some(doc) = msg.document() {
        return Some(BroadcastContent::Document {
            file_id: doc.file.id.clone(),
            caption,
        });
    }

    caption.map(|text| BroadcastContent::Text { text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_bot_suffix_and_args() {
        assert_eq!(
            parse_command("/ban@my_bot 123456"),
            ("ban".to_string(), "123456".to_string())
        );
        assert_eq!(parse_command("/stats"), ("stats".to_string(), String::new()));
        assert_eq!(
            parse_command("/DEL broadcast_42"),
            ("del".to_string(), "broadcast_42".to_string())
        );
    }
}
