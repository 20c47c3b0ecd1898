//! JSONL replay driver.
//!
//! Serves history from an archive file (one [`Message`] per line) and live
//! events from a script file (one [`PlatformEvent`] per line, delivered in
//! file order, then the stream closes). Lets the full pipeline run without a
//! live platform session; production drivers implement the same traits out
//! of tree.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    io::BufRead,
    path::Path,
};

use {async_trait::async_trait, tracing::info};

use chronicle_store::Message;

use crate::{
    client::{PlatformClient, PlatformListener, UserProfile},
    error::{Error, Result},
    events::PlatformEvent,
};

pub struct ReplayClient {
    messages: HashMap<String, Message>,
}

impl ReplayClient {
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    /// Load an archive of messages from a JSONL file. Blank lines are
    /// skipped; a malformed line is an error (the archive is operator
    /// input, not wire data).
    pub fn from_archive(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut messages = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            messages.push(serde_json::from_str(trimmed)?);
        }
        Ok(Self::new(messages))
    }
}

#[async_trait]
impl PlatformClient for ReplayClient {
    async fn fetch_history(
        &self,
        thread_id: &str,
        before_ms: i64,
        page_size: usize,
    ) -> Result<Vec<Message>> {
        let mut page: Vec<Message> = self
            .messages
            .values()
            .filter(|m| m.thread_id == thread_id && m.created_at_ms < before_ms)
            .cloned()
            .collect();
        page.sort_by(|a, b| (a.created_at_ms, &a.id).cmp(&(b.created_at_ms, &b.id)));
        // The newest `page_size` of what is older than the bound.
        let start = page.len().saturating_sub(page_size);
        Ok(page.split_off(start))
    }

    async fn fetch_full_message(&self, message_id: &str) -> Result<Message> {
        self.messages
            .get(message_id)
            .cloned()
            .ok_or_else(|| Error::unknown_id(message_id))
    }

    async fn fetch_participants(&self, thread_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .messages
            .values()
            .filter(|m| m.thread_id == thread_id)
            .map(|m| m.author_id.clone())
            .collect())
    }

    async fn fetch_user_profile(&self, user_id: &str) -> Result<UserProfile> {
        // The archive carries no profile data; echo the id as the name.
        Ok(UserProfile {
            id: user_id.into(),
            display_name: user_id.into(),
            nickname: None,
            profile_image: None,
        })
    }

    async fn send_text(&self, thread_id: &str, text: &str, reply_to: Option<&str>) -> Result<()> {
        info!(thread_id, reply_to, text, "replay: text send dropped");
        Ok(())
    }

    async fn react(&self, message_id: &str, reaction: Option<&str>) -> Result<()> {
        info!(message_id, reaction, "replay: reaction dropped");
        Ok(())
    }
}

pub struct ReplayListener {
    events: VecDeque<PlatformEvent>,
}

impl ReplayListener {
    #[must_use]
    pub fn new(events: Vec<PlatformEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Load an event script from a JSONL file.
    pub fn from_script(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            events.push(serde_json::from_str(trimmed)?);
        }
        Ok(Self::new(events))
    }
}

#[async_trait]
impl PlatformListener for ReplayListener {
    async fn next_event(&mut self) -> Result<PlatformEvent> {
        self.events.pop_front().ok_or(Error::StreamClosed)
    }
}
