use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// What a media payload is, decided once at upload from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    /// Legacy/demo items whose payload is plain text rather than pixels.
    Text,
}

impl MediaKind {
    /// Classification mirrors upload behavior: anything that is not
    /// `video/*` counts as an image. `Text` is only ever assigned
    /// explicitly by the demo seeder.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Text => write!(f, "text"),
        }
    }
}

/// A reply hanging off a media comment or a guestbook message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Reply {
    pub fn new(name: Option<String>, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.filter(|n| !n.trim().is_empty()).unwrap_or_else(default_author),
            text,
            at: Utc::now(),
        }
    }
}

/// A comment on a media item.
///
/// Replies append at the tail (oldest first). Reactions are a plain emoji
/// tally with no per-client de-duplication: every call increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub author: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
}

impl Comment {
    pub fn new(text: String, author: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            author: author.filter(|a| !a.trim().is_empty()).unwrap_or_else(default_author),
            at: Utc::now(),
            replies: Vec::new(),
            reactions: BTreeMap::new(),
        }
    }
}

/// Metadata for one uploaded photo or video. The binary payload is stored
/// separately under the same id and never embedded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    pub filename: String,
    pub size: u64,
    pub kind: MediaKind,
    pub mime: String,
    pub created_at: DateTime<Utc>,
    pub favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl MediaItem {
    pub fn new(filename: String, size: u64, mime: String, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MediaKind::from_mime(&mime),
            filename,
            size,
            mime,
            created_at: Utc::now(),
            favorite: false,
            tags,
            comments: Vec::new(),
        }
    }
}

/// A free-standing guestbook entry.
///
/// Replies prepend (newest first), the opposite of media comment replies.
/// Reactions are capped at one active emoji per client: `reacted_by` maps a
/// client id to its current choice, and `reactions` counts distinct clients
/// currently holding each emoji.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestbookMessage {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
    #[serde(default)]
    pub reacted_by: BTreeMap<String, String>,
}

impl GuestbookMessage {
    pub fn new(name: Option<String>, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.filter(|n| !n.trim().is_empty()).unwrap_or_else(default_author),
            text,
            at: Utc::now(),
            replies: Vec::new(),
            reactions: BTreeMap::new(),
            reacted_by: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Placeholder gate for the gallery, explicitly not a security boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privacy {
    #[serde(default)]
    pub password: String,
}

/// The single settings record. Created lazily with defaults on first read,
/// always written back whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub upload_limit: u32,
    #[serde(default)]
    pub privacy: Privacy,
    pub love_start_date: NaiveDate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            upload_limit: 100,
            privacy: Privacy::default(),
            // The day the two of them count from.
            love_start_date: NaiveDate::from_ymd_opt(2025, 5, 29).expect("valid date"),
        }
    }
}

fn default_author() -> String {
    "Guest".to_string()
}
