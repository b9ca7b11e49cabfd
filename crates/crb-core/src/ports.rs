use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, UserId},
    Result,
};

/// Remote channel-API surface the bot depends on.
///
/// Telegram is the only implementation today; keeping it behind a trait keeps
/// teloxide out of the core and lets tests script per-channel outcomes.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    async fn ban_member(&self, chat_id: ChatId, user_id: UserId) -> Result<()>;

    /// `only_if_banned` avoids kicking members that were never banned.
    async fn unban_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        only_if_banned: bool,
    ) -> Result<()>;

    async fn send_content(&self, chat_id: ChatId, content: &BroadcastContent)
        -> Result<MessageId>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;

    async fn member_count(&self, chat_id: ChatId) -> Result<i64>;
}

/// Re-sendable copy of an operator message. Delivery must not re-interpret
/// formatting; captions travel with their media.
#[derive(Clone, Debug)]
pub enum BroadcastContent {
    Text { text: String },
    Photo { file_id: String, caption: Option<String> },
    Video { file_id: String, caption: Option<String> },
    Document { file_id: String, caption: Option<String> },
}

/// Handle to an already-sent operator status message that fan-out runs edit
/// in place while they progress.
#[async_trait]
pub trait StatusMessage: Send + Sync {
    async fn edit(&self, text: &str) -> Result<()>;
}
