//! Durable mirror of one chat thread: messages, reactions, users.
//! Documents are stored as JSON blobs keyed by their platform id, with
//! idempotent upsert semantics (re-ingesting a record overwrites in place).

pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod types;

pub use {
    store::MessageStore,
    store_memory::MemoryStore,
    store_sqlite::SqliteStore,
    types::{Attachment, Mention, Message, User},
};

/// Run database migrations for the store crate.
///
/// Creates the `messages` and `users` tables. Called by
/// [`SqliteStore::new`]; call it yourself when handing
/// [`SqliteStore::with_pool`] a shared pool.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
