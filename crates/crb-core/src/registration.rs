//! Channel registration from forwarded messages and bot-added events.

use std::sync::Arc;

use crate::{
    domain::ChatId,
    formatting::escape_html,
    ports::ChannelApi,
    store::ChannelStore,
    Result,
};

/// Identity of a channel as seen in a Telegram update.
#[derive(Clone, Debug)]
pub struct ChannelInfo {
    pub chat_id: ChatId,
    pub title: String,
    pub username: Option<String>,
}

/// Registers channels and keeps their member counts fresh.
pub struct Registrar {
    api: Arc<dyn ChannelApi>,
    store: Arc<dyn ChannelStore>,
}

impl Registrar {
    pub fn new(api: Arc<dyn ChannelApi>, store: Arc<dyn ChannelStore>) -> Self {
        Self { api, store }
    }

    /// Register (or refresh) a channel seen via a forwarded message and
    /// return the operator-facing reply.
    pub async fn register_forwarded(&self, info: &ChannelInfo) -> Result<String> {
        let is_new = self
            .store
            .register_channel(info.chat_id, &info.title, info.username.as_deref())
            .await?;
        if !is_new {
            self.store.increment_forward_count(info.chat_id).await?;
        }

        let member_info = self.refresh_member_count(info).await;
        let name = escape_html(&info.title);

        let reply = if is_new {
            let username = info
                .username
                .as_deref()
                .map(|u| format!("@{u}"))
                .unwrap_or_else(|| "None".to_string());
            format!(
                "🎉 <b>Channel Registered Successfully!</b>\n\n\
                 📋 Channel Details:\n\
                 • Name: {name}\n\
                 • ID: <code>{}</code>\n\
                 • Username: {}\n\
                 {member_info}\n\n\
                 ✅ Your channel is now registered and being tracked!",
                info.chat_id.0,
                escape_html(&username),
            )
        } else {
            format!(
                "📊 <b>Channel Activity Updated!</b>\n\n\
                 📋 Channel: {name}\n\
                 {member_info}\n\n\
                 🔄 Status: Channel already registered. Activity updated!",
            )
        };

        tracing::info!(chat_id = info.chat_id.0, is_new, "forwarded-message registration handled");
        Ok(reply)
    }

    /// Register a channel the bot was just added to; returns the
    /// confirmation for whoever added it.
    pub async fn register_added(&self, info: &ChannelInfo) -> Result<String> {
        let is_new = self
            .store
            .register_channel(info.chat_id, &info.title, info.username.as_deref())
            .await?;

        let member_info = self.refresh_member_count(info).await;
        let name = escape_html(&info.title);

        let reply = if is_new {
            format!(
                "🎉 <b>Channel Registration Successful!</b>\n\n\
                 ✅ {name} is now registered!\n\
                 {member_info}\n\n\
                 📊 Features:\n\
                 • Member count tracking\n\
                 • Broadcast functionality\n\
                 • Cross-channel moderation",
            )
        } else {
            format!(
                "📊 <b>Channel Activity Updated!</b>\n\n\
                 ✅ {name} is already registered.\n\
                 {member_info}",
            )
        };

        tracing::info!(chat_id = info.chat_id.0, is_new, "bot added to channel");
        Ok(reply)
    }

    /// Best-effort member-count refresh; the bot may lack admin rights.
    async fn refresh_member_count(&self, info: &ChannelInfo) -> String {
        match self.api.member_count(info.chat_id).await {
            Ok(count) => {
                if let Err(err) = self.store.update_member_count(info.chat_id, count).await {
                    tracing::warn!(chat_id = info.chat_id.0, error = %err, "member count not persisted");
                }
                format!("👥 Current Members: {count}")
            }
            Err(err) => {
                tracing::warn!(chat_id = info.chat_id.0, error = %err, "member count unavailable");
                "⚠️ Member count unavailable (bot needs admin rights)".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{FakeApi, FakeStore};

    fn info(chat_id: i64, title: &str) -> ChannelInfo {
        ChannelInfo {
            chat_id: ChatId(chat_id),
            title: title.to_string(),
            username: Some("newsfeed".to_string()),
        }
    }

    #[tokio::test]
    async fn first_forward_registers_and_tracks_members() {
        let api = Arc::new(FakeApi::new());
        api.set_member_count(-100, 250);
        let store = Arc::new(FakeStore::new());
        let r = Registrar::new(api, store.clone());

        let reply = r.register_forwarded(&info(-100, "News")).await.unwrap();
        assert!(reply.contains("Channel Registered Successfully"));
        assert!(reply.contains("👥 Current Members: 250"));
        assert!(reply.contains("@newsfeed"));
        assert_eq!(store.member_updates.lock().unwrap().as_slice(), &[(-100, 250)]);
        assert!(store.forward_bumps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeat_forward_refreshes_and_bumps_forward_count() {
        let api = Arc::new(FakeApi::new());
        api.set_member_count(-100, 250);
        let store = Arc::new(FakeStore::new());
        let r = Registrar::new(api, store.clone());

        let _ = r.register_forwarded(&info(-100, "News")).await.unwrap();
        let reply = r.register_forwarded(&info(-100, "News")).await.unwrap();

        assert!(reply.contains("Channel Activity Updated"));
        assert_eq!(store.forward_bumps.lock().unwrap().as_slice(), &[-100]);
    }

    #[tokio::test]
    async fn missing_member_rights_degrade_gracefully() {
        let api = Arc::new(FakeApi::new()); // no scripted count -> member_count errors
        let store = Arc::new(FakeStore::new());
        let r = Registrar::new(api, store.clone());

        let reply = r.register_added(&info(-100, "News")).await.unwrap();
        assert!(reply.contains("Channel Registration Successful"));
        assert!(reply.contains("Member count unavailable"));
        assert!(store.member_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn channel_titles_are_escaped() {
        let api = Arc::new(FakeApi::new());
        let store = Arc::new(FakeStore::new());
        let r = Registrar::new(api, store);

        let reply = r
            .register_added(&info(-100, "<script>alert</script>"))
            .await
            .unwrap();
        assert!(reply.contains("&lt;script&gt;"));
    }
}
