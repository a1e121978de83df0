use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_timestamp;

/// Status string the messaging endpoints use for a good response.
pub const STATUS_SUCCESS: &str = "success";

/// Server-side conversation identifier. The endpoints emit it either as a
/// JSON number or a string; both normalise to the same value.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "RawConversationId", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ConversationId> for String {
    fn from(value: ConversationId) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConversationId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawConversationId> for ConversationId {
    fn from(value: RawConversationId) -> Self {
        match value {
            RawConversationId::Number(n) => Self(n.to_string()),
            RawConversationId::Text(s) => Self(s),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "String")]
pub enum ApiStatus {
    Ok,
    /// Anything other than `"success"`, kept verbatim for logging.
    NotOk(String),
}

impl From<String> for ApiStatus {
    fn from(value: String) -> Self {
        if value == STATUS_SUCCESS {
            ApiStatus::Ok
        } else {
            ApiStatus::NotOk(value)
        }
    }
}

/// Body of `GET /messaging/unread-count/`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct UnreadSummary {
    pub status: ApiStatus,
    #[serde(default)]
    pub total_unread: Option<u64>,
}

/// Body of `GET /messaging/notifications/`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NotificationsResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub unread_conversations: Vec<ConversationNotification>,
}

/// One unread conversation as reported by the notifications endpoint.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ConversationNotification {
    pub id: ConversationId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub last_message_preview: String,
    /// Raw ISO-8601 string, parsed lazily so one odd entry does not poison
    /// the whole response.
    pub timestamp: String,
}

impl ConversationNotification {
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// `"{sender}: {preview}"`, the line used by both native and in-page notices.
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.sender_name, self.last_message_preview)
    }
}

pub fn conversation_path(id: &ConversationId) -> String {
    format!("/messaging/conversation/{id}/")
}
