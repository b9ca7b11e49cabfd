//! Ban/unban a user across every registered channel.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    classify::{classify_ban, classify_unban},
    domain::{MessageId, UserId},
    fanout::{self, FanOutAction, FanOutTarget, TargetOutcome},
    ports::ChannelApi,
    report,
    store::{ChannelRecord, ChannelStore},
    Error, Result,
};

pub const INVALID_USER_ID: &str =
    "❌ Invalid user ID. Please provide a valid numeric user ID.";
pub const NO_CHANNELS: &str = "❌ No channels registered yet.";

/// Moderation fan-out over all registered channels.
///
/// Constructed once at startup and injected into the command handlers.
pub struct Moderator {
    api: Arc<dyn ChannelApi>,
    store: Arc<dyn ChannelStore>,
}

impl Moderator {
    pub fn new(api: Arc<dyn ChannelApi>, store: Arc<dyn ChannelStore>) -> Self {
        Self { api, store }
    }

    /// Ban `user_id` from every registered channel and return the operator
    /// report. Invalid input short-circuits before any remote call.
    pub async fn ban_all(&self, user_id: &str) -> Result<String> {
        let Some(uid) = parse_user_id(user_id) else {
            return Ok(INVALID_USER_ID.to_string());
        };

        let channels = self.store.list_active().await?;
        if channels.is_empty() {
            return Ok(NO_CHANNELS.to_string());
        }

        let action = BanAction {
            api: Arc::clone(&self.api),
            user_id: uid,
        };
        let run = fanout::run(&targets(&channels), &action, None, 0).await;
        tracing::info!(
            user_id = uid.0,
            succeeded = run.succeeded,
            failed = run.failed,
            "ban fan-out finished"
        );
        Ok(report::render_ban_report(user_id, &run))
    }

    /// Unban `user_id` in every registered channel. A user who was never
    /// banned in some channel is reported as informational there.
    pub async fn unban_all(&self, user_id: &str) -> Result<String> {
        let Some(uid) = parse_user_id(user_id) else {
            return Ok(INVALID_USER_ID.to_string());
        };

        let channels = self.store.list_active().await?;
        if channels.is_empty() {
            return Ok(NO_CHANNELS.to_string());
        }

        let action = UnbanAction {
            api: Arc::clone(&self.api),
            user_id: uid,
        };
        let run = fanout::run(&targets(&channels), &action, None, 0).await;
        tracing::info!(
            user_id = uid.0,
            succeeded = run.succeeded,
            failed = run.failed,
            "unban fan-out finished"
        );
        Ok(report::render_unban_report(user_id, &run))
    }
}

/// Accepts digits only, mirroring the remote API's id format.
fn parse_user_id(raw: &str) -> Option<UserId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().map(UserId)
}

pub(crate) fn targets(channels: &[ChannelRecord]) -> Vec<FanOutTarget> {
    channels
        .iter()
        .map(|c| FanOutTarget {
            chat_id: c.chat_id,
            name: c.name.clone(),
        })
        .collect()
}

struct BanAction {
    api: Arc<dyn ChannelApi>,
    user_id: UserId,
}

#[async_trait]
impl FanOutAction for BanAction {
    async fn apply(&self, target: &FanOutTarget) -> Result<Option<MessageId>> {
        self.api.ban_member(target.chat_id, self.user_id).await?;
        Ok(None)
    }

    fn classify(&self, err: &Error) -> TargetOutcome {
        classify_ban(err)
    }
}

struct UnbanAction {
    api: Arc<dyn ChannelApi>,
    user_id: UserId,
}

#[async_trait]
impl FanOutAction for UnbanAction {
    async fn apply(&self, target: &FanOutTarget) -> Result<Option<MessageId>> {
        self.api
            .unban_member(target.chat_id, self.user_id, true)
            .await?;
        Ok(None)
    }

    fn classify(&self, err: &Error) -> TargetOutcome {
        classify_unban(err)
    }
}
