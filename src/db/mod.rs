//! Database module for persistent storage.
//!
//! Provides async SQLite database access using SQLx. The only persisted state
//! is the topic of each channel, so that a channel recreated after emptying
//! comes back with the topic it had.
//!
//! The daemon talks to storage through the [`ChannelStore`] trait; when no
//! `[database]` section is configured it uses [`NoopStore`].

mod channels;

pub use channels::{ChannelRepository, TopicRecord};

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence used by the channel handlers.
///
/// Keys are case-folded channel names.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Topic saved for `channel`, if any.
    async fn load_topic(&self, channel: &str) -> Result<Option<TopicRecord>, DbError>;

    /// Save (or replace) the topic for `channel`.
    async fn save_topic(&self, channel: &str, topic: &TopicRecord) -> Result<(), DbError>;
}

/// Store that remembers nothing.
pub struct NoopStore;

#[async_trait]
impl ChannelStore for NoopStore {
    async fn load_topic(&self, _channel: &str) -> Result<Option<TopicRecord>, DbError> {
        Ok(None)
    }

    async fn save_topic(&self, _channel: &str, _topic: &TopicRecord) -> Result<(), DbError> {
        Ok(())
    }
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open (creating if needed) the database at `path` and apply migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Uniquely named shared-cache database so parallel tests don't collide.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:relayd-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get channel repository.
    pub fn channels(&self) -> ChannelRepository<'_> {
        ChannelRepository::new(&self.pool)
    }
}

#[async_trait]
impl ChannelStore for Database {
    async fn load_topic(&self, channel: &str) -> Result<Option<TopicRecord>, DbError> {
        self.channels().load_topic(channel).await
    }

    async fn save_topic(&self, channel: &str, topic: &TopicRecord) -> Result<(), DbError> {
        self.channels().save_topic(channel, topic).await
    }
}
