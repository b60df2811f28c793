use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TaskId = String;

pub const MILLIS_PER_DAY: i64 = 86_400_000;
pub const MIN_DEADLINE_DAYS: u32 = 1;
pub const MAX_DEADLINE_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Absolute deadline in epoch millis. Set once at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
}

impl Task {
    /// Build a new task due `days` days after `now_ms`.
    pub fn new(id: TaskId, content: String, days: u32, now_ms: i64) -> Self {
        Self {
            id,
            content,
            completed: false,
            start_time: None,
            deadline: Some(now_ms + i64::from(days) * MILLIS_PER_DAY),
        }
    }

    /// Id derived from the creation timestamp. `taken` reports ids already on
    /// the board; a numeric suffix keeps the result unique.
    pub fn generate_id(now_ms: i64, taken: impl Fn(&str) -> bool) -> TaskId {
        let base = format!("task-{}", now_ms);
        if !taken(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or(base)
    }

    /// Lenient decoding of one remote task entry. Entries without a string
    /// `id` and `content` are rejected; every other field falls back to its
    /// default when it has the wrong shape.
    pub fn from_remote(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id")?.as_str()?.to_string();
        let content = object.get("content")?.as_str()?.to_string();
        Some(Self {
            id,
            content,
            completed: object
                .get("completed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            start_time: object.get("startTime").and_then(Value::as_i64),
            deadline: object.get("deadline").and_then(Value::as_i64),
        })
    }
}
