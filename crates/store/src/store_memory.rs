//! In-memory store for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use {anyhow::Result, async_trait::async_trait};

use crate::{
    store::MessageStore,
    types::{Message, User},
};

/// In-memory store backed by `HashMap`. No persistence — for tests only.
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<HashMap<String, Message>>,
    users: Mutex<HashMap<String, User>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn upsert_message(&self, message: &Message) -> Result<bool> {
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        Ok(messages
            .insert(message.id.clone(), message.clone())
            .is_some())
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        let messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        Ok(messages.get(id).cloned())
    }

    async fn latest_message_timestamp(&self) -> Result<Option<i64>> {
        let messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        Ok(messages.values().map(|m| m.created_at_ms).max())
    }

    async fn mark_unsent(&self, id: &str) -> Result<bool> {
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        match messages.get_mut(id) {
            Some(message) => {
                message.unsent = true;
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
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        match messages.get_mut(message_id) {
            Some(message) => {
                match kind {
                    Some(kind) => {
                        message.reactions.insert(author_id.into(), kind.into());
                    },
                    None => {
                        message.reactions.remove(author_id);
                    },
                }
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn upsert_user(&self, user: &User) -> Result<bool> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        match users.get_mut(&user.id) {
            Some(existing) => {
                existing.display_name = user.display_name.clone();
                existing.nickname = user.nickname.clone();
                existing.profile_image = user.profile_image.clone();
                Ok(true)
            },
            None => {
                users.insert(user.id.clone(), user.clone());
                Ok(false)
            },
        }
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(id).cloned())
    }

    async fn user_ids(&self) -> Result<HashSet<String>> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.keys().cloned().collect())
    }

    async fn set_last_read(&self, user_id: &str, at_ms: i64) -> Result<()> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(user) = users.get_mut(user_id) {
            user.last_read_at_ms = at_ms;
        }
        Ok(())
    }
}
