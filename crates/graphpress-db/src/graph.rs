use anyhow::Result;

use graphpress_types::GraphId;
use graphpress_types::models::{MessageEdge, UserNode};

/// Node and edge operations the HTTP layer consumes.
///
/// Calls are blocking. Async callers run them on the blocking pool.
/// Lookups return `Ok(None)` for unknown IDs; `Err` means the store itself failed.
pub trait GraphStore: Send + Sync {
    fn node(&self, id: &GraphId) -> Result<Option<UserNode>>;

    fn edge(&self, id: &GraphId) -> Result<Option<MessageEdge>>;

    /// Creates an unread message edge from `from` to `to`.
    fn create_message(&self, from: &GraphId, to: &GraphId, content: &str) -> Result<MessageEdge>;

    /// Messages whose head is `node`, oldest first.
    fn incoming_messages(&self, node: &GraphId) -> Result<Vec<MessageEdge>>;

    /// Same as `incoming_messages(node).len()` without loading the rows.
    fn incoming_message_count(&self, node: &GraphId) -> Result<usize>;

    fn has_incoming_message(&self, node: &GraphId, msg: &GraphId) -> Result<bool>;

    fn has_sent_message(&self, node: &GraphId, msg: &GraphId) -> Result<bool>;

    /// Returns false if no such edge exists.
    fn set_is_read(&self, msg: &GraphId, is_read: bool) -> Result<bool>;

    /// Returns `None` if the username is already taken.
    fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<UserNode>>;

    fn user_by_username(&self, username: &str) -> Result<Option<UserNode>>;
}
