//! Channel topic repository.

use super::DbError;
use sqlx::SqlitePool;

/// A persisted channel topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord {
    pub text: String,
    pub set_by: String,
    /// Unix timestamp.
    pub set_at: i64,
}

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load_topic(&self, name: &str) -> Result<Option<TopicRecord>, DbError> {
        let row = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT topic, set_by, set_at FROM channel_topics WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(text, set_by, set_at)| TopicRecord {
            text,
            set_by,
            set_at,
        }))
    }

    pub async fn save_topic(&self, name: &str, topic: &TopicRecord) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO channel_topics (name, topic, set_by, set_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                topic = excluded.topic,
                set_by = excluded.set_by,
                set_at = excluded.set_at
            "#,
        )
        .bind(name)
        .bind(&topic.text)
        .bind(&topic.set_by)
        .bind(topic.set_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
