//! Shared in-memory fakes for exercising the fan-out services without a
//! network or a database.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicI32, Ordering},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    domain::{ChatId, MessageId, UserId},
    ports::{BroadcastContent, ChannelApi, StatusMessage},
    store::{ChannelRecord, ChannelStore, MemberGrowth, StoreStats},
    Error, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiCall {
    Ban(i64),
    Unban(i64),
    Send(i64),
    Delete(i64, i32),
    MemberCount(i64),
}

/// Scripted failure for a chat id; turned into an [`Error`] on demand
/// (errors are not `Clone`).
#[derive(Clone, Debug)]
pub(crate) enum ErrSpec {
    BadRequest(&'static str),
    Forbidden,
    Other,
}

impl ErrSpec {
    fn to_error(&self) -> Error {
        match self {
            ErrSpec::BadRequest(desc) => Error::BadRequest((*desc).to_string()),
            ErrSpec::Forbidden => {
                Error::Forbidden("Forbidden: bot was kicked from the channel chat".to_string())
            }
            ErrSpec::Other => Error::Telegram("request timed out".to_string()),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pub calls: Mutex<Vec<ApiCall>>,
    pub fail: Mutex<HashMap<i64, ErrSpec>>,
    pub member_counts: Mutex<HashMap<i64, i64>>,
    next_message_id: AtomicI32,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_chat(&self, chat_id: i64, spec: ErrSpec) {
        self.fail.lock().unwrap().insert(chat_id, spec);
    }

    pub fn set_member_count(&self, chat_id: i64, count: i64) {
        self.member_counts.lock().unwrap().insert(chat_id, count);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn scripted_error(&self, chat_id: i64) -> Option<Error> {
        self.fail.lock().unwrap().get(&chat_id).map(ErrSpec::to_error)
    }
}

#[async_trait]
impl ChannelApi for FakeApi {
    async fn ban_member(&self, chat_id: ChatId, _user_id: UserId) -> Result<()> {
        self.calls.lock().unwrap().push(ApiCall::Ban(chat_id.0));
        match self.scripted_error(chat_id.0) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn unban_member(
        &self,
        chat_id: ChatId,
        _user_id: UserId,
        _only_if_banned: bool,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(ApiCall::Unban(chat_id.0));
        match self.scripted_error(chat_id.0) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn send_content(
        &self,
        chat_id: ChatId,
        _content: &BroadcastContent,
    ) -> Result<MessageId> {
        self.calls.lock().unwrap().push(ApiCall::Send(chat_id.0));
        match self.scripted_error(chat_id.0) {
            Some(err) => Err(err),
            None => Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1)),
        }
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::Delete(chat_id.0, message_id.0));
        match self.scripted_error(chat_id.0) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn member_count(&self, chat_id: ChatId) -> Result<i64> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::MemberCount(chat_id.0));
        self.member_counts
            .lock()
            .unwrap()
            .get(&chat_id.0)
            .copied()
            .ok_or_else(|| Error::BadRequest("member list is inaccessible".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    pub channels: Mutex<Vec<ChannelRecord>>,
    pub member_updates: Mutex<Vec<(i64, i64)>>,
    pub forward_bumps: Mutex<Vec<i64>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `n` active channels, ids -1001..-(1000 + n).
    pub fn with_channels(n: i64) -> Self {
        let store = Self::default();
        {
            let mut channels = store.channels.lock().unwrap();
            for i in 1..=n {
                channels.push(record(-(1000 + i), &format!("Channel {i}")));
            }
        }
        store
    }
}

pub(crate) fn record(chat_id: i64, name: &str) -> ChannelRecord {
    ChannelRecord {
        chat_id: ChatId(chat_id),
        name: name.to_string(),
        username: None,
        registered_at: Utc::now(),
        is_active: true,
        forward_count: 0,
        last_activity_at: Utc::now(),
        current_members: 0,
    }
}

#[async_trait]
impl ChannelStore for FakeStore {
    async fn register_channel(
        &self,
        chat_id: ChatId,
        name: &str,
        username: Option<&str>,
    ) -> Result<bool> {
        let mut channels = self.channels.lock().unwrap();
        if let Some(existing) = channels.iter_mut().find(|c| c.chat_id == chat_id) {
            existing.last_activity_at = Utc::now();
            existing.is_active = true;
            return Ok(false);
        }
        let mut rec = record(chat_id.0, name);
        rec.username = username.map(str::to_string);
        channels.push(rec);
        Ok(true)
    }

    async fn list_active(&self) -> Result<Vec<ChannelRecord>> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn increment_forward_count(&self, chat_id: ChatId) -> Result<()> {
        self.forward_bumps.lock().unwrap().push(chat_id.0);
        let mut channels = self.channels.lock().unwrap();
        if let Some(existing) = channels.iter_mut().find(|c| c.chat_id == chat_id) {
            existing.forward_count += 1;
        }
        Ok(())
    }

    async fn update_member_count(&self, chat_id: ChatId, members: i64) -> Result<()> {
        self.member_updates.lock().unwrap().push((chat_id.0, members));
        let mut channels = self.channels.lock().unwrap();
        if let Some(existing) = channels.iter_mut().find(|c| c.chat_id == chat_id) {
            existing.current_members = members;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let channels = self.channels.lock().unwrap();
        Ok(StoreStats {
            active_channels: channels.iter().filter(|c| c.is_active).count() as i64,
            total_members: channels
                .iter()
                .filter(|c| c.is_active)
                .map(|c| c.current_members)
                .sum(),
        })
    }

    async fn member_growth_today(&self, _chat_id: ChatId) -> Result<MemberGrowth> {
        Ok(MemberGrowth::NoData)
    }
}

#[derive(Default)]
pub(crate) struct RecordingStatus {
    pub edits: Mutex<Vec<String>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusMessage for RecordingStatus {
    async fn edit(&self, text: &str) -> Result<()> {
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
