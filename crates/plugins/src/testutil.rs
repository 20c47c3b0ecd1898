//! Shared test doubles for this crate's unit tests.

use std::collections::HashSet;

use async_trait::async_trait;

use {
    chronicle_platform::{PlatformClient, Result, UserProfile},
    chronicle_store::Message,
};

/// A platform client that accepts sends and knows nothing.
pub struct NullClient;

#[async_trait]
impl PlatformClient for NullClient {
    async fn fetch_history(
        &self,
        _thread_id: &str,
        _before_ms: i64,
        _page_size: usize,
    ) -> Result<Vec<Message>> {
        Ok(vec![])
    }

    async fn fetch_full_message(&self, message_id: &str) -> Result<Message> {
        Err(chronicle_platform::Error::unknown_id(message_id))
    }

    async fn fetch_participants(&self, _thread_id: &str) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    async fn fetch_user_profile(&self, user_id: &str) -> Result<UserProfile> {
        Err(chronicle_platform::Error::unknown_id(user_id))
    }

    async fn send_text(
        &self,
        _thread_id: &str,
        _text: &str,
        _reply_to: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    async fn react(&self, _message_id: &str, _reaction: Option<&str>) -> Result<()> {
        Ok(())
    }
}
