//! Shared test doubles for this crate's unit tests.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use {anyhow::Result as AnyResult, async_trait::async_trait};

use {
    chronicle_platform::{
        Error, PlatformClient, PlatformEvent, PlatformListener, Result, UserProfile,
    },
    chronicle_plugins::{Capability, ChatPlugin, PluginContext},
    chronicle_store::{Message, User},
};

/// A scriptable platform client: history pages and full-message failures
/// are served from queues, everything else from in-memory maps.
#[derive(Default)]
pub struct ScriptedClient {
    /// Pages served by `fetch_history`, in order. Exhausted → empty page.
    pub pages: Mutex<VecDeque<Result<Vec<Message>>>>,
    /// Messages served by `fetch_full_message`.
    pub full: Mutex<HashMap<String, Message>>,
    /// Errors served by `fetch_full_message` before the map is consulted.
    pub full_errors: Mutex<VecDeque<Error>>,
    pub participants: Mutex<HashSet<String>>,
    pub profiles: Mutex<HashMap<String, UserProfile>>,
    pub history_calls: AtomicUsize,
    pub full_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn push_page(&self, page: Vec<Message>) {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(page));
    }

    pub fn push_page_error(&self, error: Error) {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    pub fn insert_full(&self, message: Message) {
        self.full
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(message.id.clone(), message);
    }

    pub fn push_full_error(&self, error: Error) {
        self.full_errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(error);
    }

    pub fn set_participants(&self, ids: &[&str]) {
        let mut participants = self.participants.lock().unwrap_or_else(|e| e.into_inner());
        *participants = ids.iter().map(|s| (*s).to_string()).collect();
        let mut profiles = self.profiles.lock().unwrap_or_else(|e| e.into_inner());
        for id in ids {
            profiles.entry((*id).to_string()).or_insert(UserProfile {
                id: (*id).to_string(),
                display_name: format!("{id} (profile)"),
                nickname: None,
                profile_image: None,
            });
        }
    }
}

#[async_trait]
impl PlatformClient for ScriptedClient {
    async fn fetch_history(
        &self,
        _thread_id: &str,
        _before_ms: i64,
        _page_size: usize,
    ) -> Result<Vec<Message>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Ok(vec![]))
    }

    async fn fetch_full_message(&self, message_id: &str) -> Result<Message> {
        self.full_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self
            .full_errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Err(error);
        }
        self.full
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(message_id)
            .cloned()
            .ok_or_else(|| Error::unknown_id(message_id))
    }

    async fn fetch_participants(&self, _thread_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .participants
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn fetch_user_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.profiles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::unknown_id(user_id))
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

/// A listener fed from a queue; exhausted → `StreamClosed`.
pub struct QueueListener {
    events: VecDeque<Result<PlatformEvent>>,
}

impl QueueListener {
    pub fn new(events: Vec<Result<PlatformEvent>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

#[async_trait]
impl PlatformListener for QueueListener {
    async fn next_event(&mut self) -> Result<PlatformEvent> {
        self.events.pop_front().unwrap_or(Err(Error::StreamClosed))
    }
}

/// Records every hook invocation it receives.
pub struct RecordingPlugin {
    pub plugin_name: String,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingPlugin {
    pub fn new(name: &str) -> (Arc<Self>, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let plugin = Arc::new(Self {
            plugin_name: name.into(),
            seen: Arc::clone(&seen),
        });
        (plugin, seen)
    }
}

#[async_trait]
impl ChatPlugin for RecordingPlugin {
    fn name(&self) -> &str {
        &self.plugin_name
    }

    fn capabilities(&self) -> &[Capability] {
        &[
            Capability::Init,
            Capability::OnMessage,
            Capability::OnReactionAdded,
            Capability::OnReactionRemoved,
        ]
    }

    async fn init(&self, _cx: &PluginContext) -> AnyResult<()> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push("init".into());
        Ok(())
    }

    async fn on_message(
        &self,
        _cx: &PluginContext,
        author: &User,
        message: &Message,
    ) -> AnyResult<bool> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("message:{}:{}", author.id, message.id));
        Ok(true)
    }

    async fn on_reaction_added(
        &self,
        _cx: &PluginContext,
        author_id: &str,
        message_id: &str,
        reaction: &str,
    ) -> AnyResult<()> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("reaction+:{author_id}:{message_id}:{reaction}"));
        Ok(())
    }

    async fn on_reaction_removed(
        &self,
        _cx: &PluginContext,
        author_id: &str,
        message_id: &str,
    ) -> AnyResult<()> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("reaction-:{author_id}:{message_id}"));
        Ok(())
    }
}
