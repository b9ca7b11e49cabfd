use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed runtime configuration, loaded from environment variables with
/// optional `.env` file support.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    pub admin_ids: Vec<i64>,

    // Storage
    pub database_path: String,

    // Health endpoint (uptime monitors)
    pub health_port: u16,

    // Fan-out pacing
    pub broadcast_delay: Duration,
    pub delete_delay: Duration,
    pub progress_every: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let admin_ids = parse_csv_i64(env_str("ADMIN_IDS"));
        if admin_ids.is_empty() {
            return Err(Error::Config(
                "ADMIN_IDS environment variable is required".to_string(),
            ));
        }

        let database_path = env_str("DATABASE_PATH").unwrap_or_else(|| "channels.db".to_string());
        let health_port = env_u16("HEALTH_PORT").unwrap_or(5000);

        // Conservative spacing between per-channel calls; Telegram throttles
        // bots that blast channels back to back.
        let broadcast_delay = Duration::from_millis(env_u64("BROADCAST_DELAY_MS").unwrap_or(500));
        let delete_delay = Duration::from_millis(env_u64("DELETE_DELAY_MS").unwrap_or(300));
        let progress_every = env_usize("PROGRESS_EVERY").unwrap_or(5).max(1);

        Ok(Self {
            bot_token,
            admin_ids,
            database_path,
            health_port,
            broadcast_delay,
            delete_delay,
            progress_every,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}
