use std::sync::Arc;

use teloxide::Bot;

use crb_core::{
    broadcast::{BroadcastPacing, Broadcaster},
    config::Config,
    moderation::Moderator,
    ports::ChannelApi,
    registration::Registrar,
    store::ChannelStore,
};
use crb_store::SqliteChannelStore;
use crb_telegram::{
    router::{self, AppState},
    TelegramChannelApi,
};

mod health;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crb_core::logging::init("crb")?;

    let cfg = Arc::new(Config::load()?);

    let store: Arc<dyn ChannelStore> =
        Arc::new(SqliteChannelStore::connect(&cfg.database_path).await?);
    tracing::info!(path = %cfg.database_path, "channel store ready");

    tokio::spawn(health::serve(cfg.health_port));

    let bot = Bot::new(cfg.bot_token.clone());
    let api: Arc<dyn ChannelApi> = Arc::new(TelegramChannelApi::new(bot.clone()));

    let pacing = BroadcastPacing {
        send_delay: cfg.broadcast_delay,
        delete_delay: cfg.delete_delay,
        progress_every: cfg.progress_every,
    };

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        store: store.clone(),
        moderator: Arc::new(Moderator::new(api.clone(), store.clone())),
        broadcaster: Arc::new(Broadcaster::new(api.clone(), store.clone(), pacing)),
        registrar: Arc::new(Registrar::new(api, store)),
    });

    router::run_polling(bot, state).await
}
