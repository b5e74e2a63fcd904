//! Row types as they come out of SQLite. IDs and timestamps are still text
//! here; `into_model` parses them into the typed graph models.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use graphpress_types::GraphId;
use graphpress_types::models::{MessageEdge, UserNode};

pub struct NodeRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct EdgeRow {
    pub id: String,
    pub tail: String,
    pub head: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

fn parse_id(raw: &str, what: &str) -> Result<GraphId> {
    raw.parse()
        .with_context(|| format!("corrupt {} '{}'", what, raw))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("corrupt created_at '{}'", raw))?
        .with_timezone(&Utc))
}

impl NodeRow {
    pub fn into_model(self) -> Result<UserNode> {
        Ok(UserNode {
            id: parse_id(&self.id, "node id")?,
            created_at: parse_time(&self.created_at)?,
            username: self.username,
            password: self.password,
        })
    }
}

impl EdgeRow {
    pub fn into_model(self) -> Result<MessageEdge> {
        Ok(MessageEdge {
            id: parse_id(&self.id, "edge id")?,
            tail: parse_id(&self.tail, "edge tail")?,
            head: parse_id(&self.head, "edge head")?,
            is_read: self.is_read,
            created_at: parse_time(&self.created_at)?,
            content: self.content,
        })
    }
}
