use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{domain::ChatId, Result};

/// A registered channel as persisted by the store.
#[derive(Clone, Debug)]
pub struct ChannelRecord {
    pub chat_id: ChatId,
    pub name: String,
    pub username: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub forward_count: i64,
    pub last_activity_at: DateTime<Utc>,
    pub current_members: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub active_channels: i64,
    pub total_members: i64,
}

/// Day-over-day member delta computed from the member-count history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberGrowth {
    Delta(i64),
    /// History started today; nothing to compare against yet.
    NewTracking,
    NoData,
}

/// Persistence port for channel registrations and member-count history.
///
/// One row per channel id; channels are never hard-deleted, only
/// `is_active` is maintained.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Insert the channel or refresh its activity. Returns `true` when the
    /// channel was not previously registered.
    async fn register_channel(
        &self,
        chat_id: ChatId,
        name: &str,
        username: Option<&str>,
    ) -> Result<bool>;

    /// Active channels, newest registration first.
    async fn list_active(&self) -> Result<Vec<ChannelRecord>>;

    async fn increment_forward_count(&self, chat_id: ChatId) -> Result<()>;

    /// Update the live member count and append a history row.
    async fn update_member_count(&self, chat_id: ChatId, members: i64) -> Result<()>;

    async fn stats(&self) -> Result<StoreStats>;

    async fn member_growth_today(&self, chat_id: ChatId) -> Result<MemberGrowth>;
}
