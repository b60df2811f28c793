use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const KEYWORDS_COLLECTION: &str = "keywords";

const TRENDS_URL: &str = "https://trends.google.com/trends/explore?date=today%203-m&q=";

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordCategory {
    Addon,
    Mods,
    World,
    Tokoh,
    #[default]
    Other,
}

impl KeywordCategory {
    pub const ALL: [KeywordCategory; 5] = [
        Self::Addon,
        Self::Mods,
        Self::World,
        Self::Tokoh,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Addon => "Addon",
            Self::Mods => "Mods",
            Self::World => "World",
            Self::Tokoh => "Tokoh",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeywordCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown keyword category '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeywordSort {
    /// Newest first
    #[default]
    Date,
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub id: String,
    pub text: String,
    pub category: KeywordCategory,
    pub created_at: i64,
}

impl Keyword {
    pub fn trends_url(&self) -> String {
        trends_url(&self.text)
    }
}

/// Google Trends explore link for the last three months of `text`.
pub fn trends_url(text: &str) -> String {
    format!("{}{}", TRENDS_URL, utf8_percent_encode(text, URI_COMPONENT))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordList {
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub keywords: Vec<Keyword>,
}

impl KeywordList {
    pub fn empty(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            keywords: Vec::new(),
        }
    }

    pub fn from_remote(owner_id: &str, value: &Value) -> Self {
        let now = crate::now_millis();
        let keywords = match value.get("keywords") {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| {
                    let object = entry.as_object()?;
                    let keyword = Keyword {
                        id: object.get("id")?.as_str()?.to_string(),
                        text: object.get("text")?.as_str()?.to_string(),
                        category: object
                            .get("category")
                            .and_then(Value::as_str)
                            .and_then(|c| c.parse().ok())
                            .unwrap_or_default(),
                        created_at: object
                            .get("createdAt")
                            .and_then(Value::as_i64)
                            .unwrap_or(now),
                    };
                    Some(keyword)
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            owner_id: owner_id.to_string(),
            keywords,
        }
    }

    pub fn to_remote(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Returns the new keyword's id, or `None` when the text is blank.
    pub fn add(&mut self, text: &str, category: KeywordCategory, now_ms: i64) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = Uuid::new_v4().to_string();
        self.keywords.push(Keyword {
            id: id.clone(),
            text: text.to_string(),
            category,
            created_at: now_ms,
        });
        Some(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k.id != id);
        self.keywords.len() != before
    }

    pub fn find(&self, id: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.id == id)
    }

    pub fn list(&self, sort: KeywordSort, filter: Option<KeywordCategory>) -> Vec<&Keyword> {
        let mut keywords: Vec<&Keyword> = self
            .keywords
            .iter()
            .filter(|k| filter.map_or(true, |c| k.category == c))
            .collect();
        match sort {
            KeywordSort::Date => keywords.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            KeywordSort::Alphabetical => {
                keywords.sort_by(|a, b| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
            }
        }
        keywords
    }
}
