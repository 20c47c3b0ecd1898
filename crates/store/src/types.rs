//! Canonical records mirrored from the platform.
//!
//! These types are the JSON document format persisted by the stores. Field
//! names are part of the stored format; renaming one is a migration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user mentioned inside a message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub user_id: String,
    /// Byte offset into the message text.
    pub offset: usize,
    pub length: usize,
}

/// A message attachment, tagged by kind. Each variant keeps the stable
/// platform sub-id plus the kind-specific metadata worth archiving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Image {
        id: String,
        original_extension: String,
        preview_url: Option<String>,
        preview_width: Option<u32>,
        preview_height: Option<u32>,
    },
    Video {
        id: String,
        width: Option<u32>,
        height: Option<u32>,
        duration_ms: Option<u64>,
        size: Option<u64>,
    },
    Audio {
        id: String,
        filename: Option<String>,
        duration_ms: Option<u64>,
        audio_type: Option<String>,
    },
    Share {
        id: String,
        title: Option<String>,
        url: Option<String>,
    },
    Other {
        id: String,
    },
}

impl Attachment {
    /// The platform-assigned attachment id, regardless of kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Image { id, .. }
            | Self::Video { id, .. }
            | Self::Audio { id, .. }
            | Self::Share { id, .. }
            | Self::Other { id } => id,
        }
    }
}

/// One message of the monitored thread.
///
/// Uniquely identified by `id`; re-ingesting the same id overwrites the
/// record. An unsent message keeps its content and gets `unsent` set;
/// nothing is ever hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    /// UTC epoch milliseconds.
    pub created_at_ms: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Reaction author id → reaction kind (emoji string).
    #[serde(default)]
    pub reactions: BTreeMap<String, String>,
    #[serde(default)]
    pub replied_to: Option<String>,
    #[serde(default)]
    pub unsent: bool,
}

impl Message {
    /// A bare message with no text, mentions, attachments or reactions.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        thread_id: impl Into<String>,
        author_id: impl Into<String>,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            author_id: author_id.into(),
            created_at_ms,
            text: None,
            mentions: Vec::new(),
            attachments: Vec::new(),
            reactions: BTreeMap::new(),
            replied_to: None,
            unsent: false,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A participant of the monitored thread.
///
/// `is_admin`, `last_read_at_ms` and `app_state` are owned by the running
/// system and survive roster refreshes; the remaining fields mirror the
/// platform profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    /// Thread-scoped nickname, if one is set.
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub last_read_at_ms: i64,
    /// Opaque accumulated plugin data. The sync core never interprets it.
    #[serde(default)]
    pub app_state: serde_json::Value,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            nickname: None,
            profile_image: None,
            is_admin: false,
            last_read_at_ms: 0,
            app_state: serde_json::Value::Null,
        }
    }
}
