//! SQLite-backed channel store.
//!
//! Implements the `crb-core` store port over a single SQLite file. Schema is
//! created on connect; the `member_counts` table keeps an append-only history
//! used for day-over-day growth.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crb_core::{
    domain::ChatId,
    errors::Error,
    store::{ChannelRecord, ChannelStore, MemberGrowth, StoreStats},
    Result,
};

pub struct SqliteChannelStore {
    pool: SqlitePool,
}

fn map_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

#[derive(sqlx::FromRow)]
struct ChannelRow {
    chat_id: i64,
    name: String,
    username: Option<String>,
    registered_at: DateTime<Utc>,
    is_active: bool,
    forward_count: i64,
    last_activity_at: DateTime<Utc>,
    current_members: i64,
}

impl From<ChannelRow> for ChannelRecord {
    fn from(r: ChannelRow) -> Self {
        Self {
            chat_id: ChatId(r.chat_id),
            name: r.name,
            username: r.username,
            registered_at: r.registered_at,
            is_active: r.is_active,
            forward_count: r.forward_count,
            last_activity_at: r.last_activity_at,
            current_members: r.current_members,
        }
    }
}

impl SqliteChannelStore {
    pub async fn connect(path: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite://{path}"))
            .map_err(map_err)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        Self::connect_with(opts, 4).await
    }

    /// In-memory database, used by tests. A single connection keeps every
    /// query on the same database.
    pub async fn connect_in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_err)?;
        Self::connect_with(opts, 1).await
    }

    async fn connect_with(opts: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await
            .map_err(map_err)?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }
}

async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS channels (
               chat_id          INTEGER PRIMARY KEY,
               name             TEXT NOT NULL,
               username         TEXT,
               registered_at    TEXT NOT NULL,
               is_active        INTEGER NOT NULL DEFAULT 1,
               forward_count    INTEGER NOT NULL DEFAULT 0,
               last_activity_at TEXT NOT NULL,
               current_members  INTEGER NOT NULL DEFAULT 0
           )"#,
    )
    .execute(pool)
    .await
    .map_err(map_err)?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS member_counts (
               chat_id      INTEGER NOT NULL,
               member_count INTEGER NOT NULL,
               recorded_at  TEXT NOT NULL
           )"#,
    )
    .execute(pool)
    .await
    .map_err(map_err)?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_member_counts_chat_time \
         ON member_counts (chat_id, recorded_at DESC)",
    )
    .execute(pool)
    .await
    .map_err(map_err)?;

    Ok(())
}

#[async_trait]
impl ChannelStore for SqliteChannelStore {
    async fn register_channel(
        &self,
        chat_id: ChatId,
        name: &str,
        username: Option<&str>,
    ) -> Result<bool> {
        let now = Utc::now();

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM channels WHERE chat_id = ?")
                .bind(chat_id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(map_err)?;

        if existing > 0 {
            sqlx::query("UPDATE channels SET last_activity_at = ?, is_active = 1 WHERE chat_id = ?")
                .bind(now)
                .bind(chat_id.0)
                .execute(&self.pool)
                .await
                .map_err(map_err)?;
            tracing::info!(chat_id = chat_id.0, "channel activity refreshed");
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO channels \
                 (chat_id, name, username, registered_at, is_active, forward_count, last_activity_at, current_members) \
             VALUES (?, ?, ?, ?, 1, 0, ?, 0)",
        )
        .bind(chat_id.0)
        .bind(name)
        .bind(username)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        tracing::info!(chat_id = chat_id.0, name, "channel registered");
        Ok(true)
    }

    async fn list_active(&self) -> Result<Vec<ChannelRecord>> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            "SELECT chat_id, name, username, registered_at, is_active, forward_count, \
                    last_activity_at, current_members \
             FROM channels WHERE is_active = 1 \
             ORDER BY registered_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn increment_forward_count(&self, chat_id: ChatId) -> Result<()> {
        sqlx::query(
            "UPDATE channels SET forward_count = forward_count + 1, last_activity_at = ? \
             WHERE chat_id = ?",
        )
        .bind(Utc::now())
        .bind(chat_id.0)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(())
    }

    async fn update_member_count(&self, chat_id: ChatId, members: i64) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            "UPDATE channels SET current_members = ?, last_activity_at = ? WHERE chat_id = ?",
        )
        .bind(members)
        .bind(now)
        .bind(chat_id.0)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query("INSERT INTO member_counts (chat_id, member_count, recorded_at) VALUES (?, ?, ?)")
            .bind(chat_id.0)
            .bind(members)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let (active_channels, total_members) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(current_members), 0) \
             FROM channels WHERE is_active = 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(StoreStats {
            active_channels,
            total_members,
        })
    }

    async fn member_growth_today(&self, chat_id: ChatId) -> Result<MemberGrowth> {
        let today_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let yesterday_start = today_start - Duration::days(1);

        let today = self
            .latest_count(chat_id, today_start, None)
            .await?;
        let yesterday = self
            .latest_count(chat_id, yesterday_start, Some(today_start))
            .await?;

        Ok(match (today, yesterday) {
            (Some(t), Some(y)) => MemberGrowth::Delta(t - y),
            (Some(_), None) => MemberGrowth::NewTracking,
            _ => MemberGrowth::NoData,
        })
    }
}

impl SqliteChannelStore {
    /// Latest recorded count in `[since, until)`.
    async fn latest_count(
        &self,
        chat_id: ChatId,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Option<i64>> {
        let row = match until {
            Some(until) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT member_count FROM member_counts \
                     WHERE chat_id = ? AND recorded_at >= ? AND recorded_at < ? \
                     ORDER BY recorded_at DESC LIMIT 1",
                )
                .bind(chat_id.0)
                .bind(since)
                .bind(until)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT member_count FROM member_counts \
                     WHERE chat_id = ? AND recorded_at >= ? \
                     ORDER BY recorded_at DESC LIMIT 1",
                )
                .bind(chat_id.0)
                .bind(since)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(map_err)?;

        Ok(row)
    }
}
