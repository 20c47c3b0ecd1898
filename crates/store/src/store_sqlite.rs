//! SQLite-backed message store using sqlx.

use std::collections::HashSet;

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions},
    tracing::debug,
};

use crate::{
    store::MessageStore,
    types::{Message, User},
};

/// SQLite-backed persistence for messages and users. Each record is a JSON
/// document column; `created_at_ms` is mirrored into its own indexed column
/// so the watermark query stays cheap.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with its own connection pool and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to connect to SQLite")?;

        crate::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store using an existing pool (migrations must already be run).
    ///
    /// Call [`crate::run_migrations`] before using this constructor.
    #[must_use]
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_message(&self, id: &str) -> Result<Option<Message>> {
        let row = sqlx::query("SELECT data FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            },
            None => Ok(None),
        }
    }

    async fn save_message(&self, message: &Message) -> Result<()> {
        let data = serde_json::to_string(message)?;
        sqlx::query(
            "INSERT INTO messages (id, thread_id, author_id, created_at_ms, data)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 thread_id = excluded.thread_id,
                 author_id = excluded.author_id,
                 created_at_ms = excluded.created_at_ms,
                 data = excluded.data",
        )
        .bind(&message.id)
        .bind(&message.thread_id)
        .bind(&message.author_id)
        .bind(message.created_at_ms)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn upsert_message(&self, message: &Message) -> Result<bool> {
        let existed = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM messages WHERE id = ?)",
        )
        .bind(&message.id)
        .fetch_one(&self.pool)
        .await?
            != 0;

        self.save_message(message).await?;
        Ok(existed)
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        self.load_message(id).await
    }

    async fn latest_message_timestamp(&self) -> Result<Option<i64>> {
        let max = sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(created_at_ms) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    async fn mark_unsent(&self, id: &str) -> Result<bool> {
        match self.load_message(id).await? {
            Some(mut message) => {
                message.unsent = true;
                self.save_message(&message).await?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn set_reaction(
        &self,
        message_id: &str,
        author_id: &str,
        kind: Option<&str>,
    ) -> Result<bool> {
        match self.load_message(message_id).await? {
            Some(mut message) => {
                match kind {
                    Some(kind) => {
                        message.reactions.insert(author_id.into(), kind.into());
                    },
                    None => {
                        message.reactions.remove(author_id);
                    },
                }
                self.save_message(&message).await?;
                Ok(true)
            },
            None => {
                debug!(message_id, "reaction targets a message not yet stored");
                Ok(false)
            },
        }
    }

    async fn upsert_user(&self, user: &User) -> Result<bool> {
        let existing = self.get_user(&user.id).await?;
        let existed = existing.is_some();
        let merged = match existing {
            Some(stored) => User {
                display_name: user.display_name.clone(),
                nickname: user.nickname.clone(),
                profile_image: user.profile_image.clone(),
                ..stored
            },
            None => user.clone(),
        };
        let data = serde_json::to_string(&merged)?;
        sqlx::query(
            "INSERT INTO users (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(&merged.id)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(existed)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT data FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            },
            None => Ok(None),
        }
    }

    async fn user_ids(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT id FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn set_last_read(&self, user_id: &str, at_ms: i64) -> Result<()> {
        if let Some(mut user) = self.get_user(user_id).await? {
            user.last_read_at_ms = at_ms;
            let data = serde_json::to_string(&user)?;
            sqlx::query("UPDATE users SET data = ? WHERE id = ?")
                .bind(&data)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/chronicle.db?mode=rwc", dir.path().display());
        let store = SqliteStore::new(&url).await.unwrap();
        (store, dir)
    }

    fn msg(id: &str, ts: i64) -> Message {
        Message::new(id, "t1", "u1", ts).with_text("hello")
    }

    #[tokio::test]
    async fn upsert_twice_yields_same_document() {
        let (store, _dir) = temp_store().await;
        assert!(!store.upsert_message(&msg("m1", 10)).await.unwrap());
        assert!(store.upsert_message(&msg("m1", 10)).await.unwrap());
        assert_eq!(
            store.get_message("m1").await.unwrap().unwrap(),
            msg("m1", 10)
        );
    }

    #[tokio::test]
    async fn watermark_tracks_newest_message() {
        let (store, _dir) = temp_store().await;
        assert_eq!(store.latest_message_timestamp().await.unwrap(), None);
        store.upsert_message(&msg("m1", 10)).await.unwrap();
        store.upsert_message(&msg("m2", 30)).await.unwrap();
        store.upsert_message(&msg("m3", 20)).await.unwrap();
        assert_eq!(store.latest_message_timestamp().await.unwrap(), Some(30));
    }

    #[tokio::test]
    async fn unsent_flag_survives_re_ingest() {
        let (store, _dir) = temp_store().await;
        store.upsert_message(&msg("m1", 10)).await.unwrap();
        store.mark_unsent("m1").await.unwrap();
        let stored = store.get_message("m1").await.unwrap().unwrap();
        assert!(stored.unsent);
        assert_eq!(stored.text.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn reaction_mutations_round_trip() {
        let (store, _dir) = temp_store().await;
        store.upsert_message(&msg("m1", 10)).await.unwrap();
        store.set_reaction("m1", "u2", Some("❤")).await.unwrap();
        store.set_reaction("m1", "u2", Some("😆")).await.unwrap();
        let stored = store.get_message("m1").await.unwrap().unwrap();
        assert_eq!(stored.reactions.get("u2").map(String::as_str), Some("😆"));

        store.set_reaction("m1", "u2", None).await.unwrap();
        let stored = store.get_message("m1").await.unwrap().unwrap();
        assert!(stored.reactions.is_empty());

        assert!(!store.set_reaction("missing", "u2", Some("❤")).await.unwrap());
    }

    #[tokio::test]
    async fn user_roster_round_trip() {
        let (store, _dir) = temp_store().await;
        let mut user = User::new("u1", "Alice");
        user.is_admin = true;
        assert!(!store.upsert_user(&user).await.unwrap());
        assert!(store.upsert_user(&User::new("u1", "Alice B.")).await.unwrap());
        store.upsert_user(&User::new("u2", "Bob")).await.unwrap();

        let stored = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.display_name, "Alice B.");
        assert!(stored.is_admin, "refresh must not clear privilege");

        let ids = store.user_ids().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("u2"));
    }

    #[tokio::test]
    async fn last_read_updates_existing_user_only() {
        let (store, _dir) = temp_store().await;
        store.upsert_user(&User::new("u1", "Alice")).await.unwrap();
        store.set_last_read("u1", 1234).await.unwrap();
        store.set_last_read("ghost", 1234).await.unwrap();
        let stored = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.last_read_at_ms, 1234);
        assert!(store.get_user("ghost").await.unwrap().is_none());
    }
}
