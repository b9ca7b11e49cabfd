use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use crb_core::{
    broadcast::Broadcaster, config::Config, moderation::Moderator, registration::Registrar,
    store::ChannelStore,
};

use crate::handlers;

/// Shared per-process state injected into every handler.
///
/// Everything here is constructed once in `main`; handlers never build their
/// own collaborators.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Arc<dyn ChannelStore>,
    pub moderator: Arc<Moderator>,
    pub broadcaster: Arc<Broadcaster>,
    pub registrar: Arc<Registrar>,
}

pub async fn run_polling(bot: Bot, state: Arc<AppState>) -> anyhow::Result<()> {
    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = %me.username(), "bot started");
    }
    tracing::info!(admins = state.cfg.admin_ids.len(), "admin allow-list loaded");

    let handler = dptree::entry()
        .branch(Update::filter_my_chat_member().endpoint(handlers::handle_my_chat_member))
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
