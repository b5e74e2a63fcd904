use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::GraphId;

/// Characters of message content shown in an inbox listing.
pub const INBOX_PREVIEW_CHARS: usize = 70;

/// A user vertex. The password is an argon2 PHC string, never plaintext.
#[derive(Debug, Clone)]
pub struct UserNode {
    pub id: GraphId,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// A message: directed edge from the sender (tail) to the recipient (head).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEdge {
    pub id: GraphId,
    pub tail: GraphId,
    pub head: GraphId,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageEdge {
    pub fn tail(&self) -> GraphId {
        self.tail
    }

    pub fn head(&self) -> GraphId {
        self.head
    }

    /// Edge attributes as stored, without the endpoints.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("content".into(), Value::String(self.content.clone()));
        attrs.insert("is_read".into(), Value::Bool(self.is_read));
        attrs.insert(
            "created_at".into(),
            Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        attrs
    }

    /// First [`INBOX_PREVIEW_CHARS`] characters of the content.
    pub fn preview(&self) -> String {
        self.content.chars().take(INBOX_PREVIEW_CHARS).collect()
    }
}
