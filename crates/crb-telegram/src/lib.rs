//! Telegram adapter (teloxide).
//!
//! This crate implements the `crb-core` channel-API port over the Telegram
//! Bot API and hosts the update router + command handlers.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use crb_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    ports::{BroadcastContent, ChannelApi, StatusMessage},
    Result,
};

#[derive(Clone)]
pub struct TelegramChannelApi {
    bot: Bot,
}

impl TelegramChannelApi {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_user(user_id: UserId) -> teloxide::types::UserId {
        teloxide::types::UserId(user_id.0 as u64)
    }

    /// Map teloxide errors into the core taxonomy the classifiers work on.
    ///
    /// API errors keep their description so the operation-specific substring
    /// rules can pick a reason; the kicked/blocked class becomes `Forbidden`.
    fn map_err(e: teloxide::RequestError) -> Error {
        match e {
            teloxide::RequestError::Api(api) => {
                let desc = api.to_string();
                let lower = desc.to_lowercase();
                if lower.contains("kicked") || lower.contains("blocked") || lower.contains("forbidden")
                {
                    Error::Forbidden(desc)
                } else {
                    Error::BadRequest(desc)
                }
            }
            other => Error::Telegram(other.to_string()),
        }
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl ChannelApi for TelegramChannelApi {
    async fn ban_member(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .ban_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id))
        })
        .await?;
        Ok(())
    }

    async fn unban_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        only_if_banned: bool,
    ) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .unban_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id))
                .only_if_banned(only_if_banned)
        })
        .await?;
        Ok(())
    }

    async fn send_content(
        &self,
        chat_id: ChatId,
        content: &BroadcastContent,
    ) -> Result<MessageId> {
        let msg = match content {
            BroadcastContent::Text { text } => {
                self.with_retry(|| self.bot.send_message(Self::tg_chat(chat_id), text.clone()))
                    .await?
            }
            BroadcastContent::Photo { file_id, caption } => {
                self.with_retry(|| {
                    let mut req = self
                        .bot
                        .send_photo(Self::tg_chat(chat_id), InputFile::file_id(file_id.clone()));
                    if let Some(c) = caption {
                        req = req.caption(c.clone());
                    }
                    req
                })
                .await?
            }
            BroadcastContent::Video { file_id, caption } => {
                self.with_retry(|| {
                    let mut req = self
                        .bot
                        .send_video(Self::tg_chat(chat_id), InputFile::file_id(file_id.clone()));
                    if let Some(c) = caption {
                        req = req.caption(c.clone());
                    }
                    req
                })
                .await?
            }
            BroadcastContent::Document { file_id, caption } => {
                self.with_retry(|| {
                    let mut req = self.bot.send_document(
                        Self::tg_chat(chat_id),
                        InputFile::file_id(file_id.clone()),
                    );
                    if let Some(c) = caption {
                        req = req.caption(c.clone());
                    }
                    req
                })
                .await?
            }
        };

        Ok(MessageId(msg.id.0))
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .delete_message(Self::tg_chat(chat_id), Self::tg_msg_id(message_id))
        })
        .await?;
        Ok(())
    }

    async fn member_count(&self, chat_id: ChatId) -> Result<i64> {
        let count = self
            .with_retry(|| self.bot.get_chat_member_count(Self::tg_chat(chat_id)))
            .await?;
        Ok(count as i64)
    }
}

/// Operator status message that fan-out progress edits mutate in place.
pub struct TelegramStatusMessage {
    bot: Bot,
    msg: MessageRef,
}

impl TelegramStatusMessage {
    pub fn new(bot: Bot, msg: MessageRef) -> Self {
        Self { bot, msg }
    }
}

#[async_trait]
impl StatusMessage for TelegramStatusMessage {
    async fn edit(&self, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(
                TelegramChannelApi::tg_chat(self.msg.chat_id),
                TelegramChannelApi::tg_msg_id(self.msg.message_id),
                text.to_string(),
            )
            .parse_mode(ParseMode::Html)
            .await
            .map_err(TelegramChannelApi::map_err)?;
        Ok(())
    }
}
