use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

pub const NOTES_COLLECTION: &str = "notes";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteCategory {
    #[default]
    Catatan,
    Akun,
    Link,
    MustBuy,
    Other,
}

impl NoteCategory {
    pub const ALL: [NoteCategory; 5] = [
        Self::Catatan,
        Self::Akun,
        Self::Link,
        Self::MustBuy,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catatan => "catatan",
            Self::Akun => "akun",
            Self::Link => "link",
            Self::MustBuy => "must-buy",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown note category '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    pub category: NoteCategory,
    pub created_at: i64,
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid url pattern"))
}

impl Note {
    /// URLs mentioned in a link note. Other categories carry no links.
    pub fn links(&self) -> Vec<&str> {
        if self.category != NoteCategory::Link {
            return Vec::new();
        }
        url_pattern()
            .find_iter(&self.content)
            .map(|m| m.as_str())
            .collect()
    }

    fn from_remote(value: &Value, fallback_created_at: i64) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id")?.as_str()?.to_string();
        let content = object.get("content")?.as_str()?.to_string();
        let category = object
            .get("category")
            .and_then(Value::as_str)
            .and_then(|c| c.parse().ok())
            .unwrap_or(NoteCategory::Other);
        let created_at = object
            .get("createdAt")
            .and_then(Value::as_i64)
            .unwrap_or(fallback_created_at);
        Some(Self {
            id,
            content,
            category,
            created_at,
        })
    }
}

/// All notes of one user, persisted as a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteBook {
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub notes: Vec<Note>,
}

impl NoteBook {
    pub fn empty(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            notes: Vec::new(),
        }
    }

    pub fn from_remote(owner_id: &str, value: &Value) -> Self {
        let now = crate::now_millis();
        let notes = match value.get("notes") {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| {
                    let note = Note::from_remote(entry, now);
                    if note.is_none() {
                        tracing::warn!("Dropping malformed note entry for {}", owner_id);
                    }
                    note
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            owner_id: owner_id.to_string(),
            notes,
        }
    }

    pub fn to_remote(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Returns the new note's id, or `None` when the content is blank.
    pub fn add(&mut self, content: &str, category: NoteCategory, now_ms: i64) -> Option<String> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let id = Uuid::new_v4().to_string();
        self.notes.push(Note {
            id: id.clone(),
            content: content.to_string(),
            category,
            created_at: now_ms,
        });
        Some(id)
    }

    /// Replace a note's content. The note is re-stamped with `now_ms`, which
    /// moves it to the top of the list.
    pub fn edit(&mut self, id: &str, content: &str, now_ms: i64) -> bool {
        let content = content.trim();
        if content.is_empty() {
            return false;
        }
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.content = content.to_string();
                note.created_at = now_ms;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Newest first, optionally restricted to one category.
    pub fn list(&self, filter: Option<NoteCategory>) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self
            .notes
            .iter()
            .filter(|n| filter.map_or(true, |c| n.category == c))
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes
    }
}
