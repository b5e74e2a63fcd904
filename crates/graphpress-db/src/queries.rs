use anyhow::Result;
use chrono::{SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use graphpress_types::GraphId;
use graphpress_types::models::{MessageEdge, UserNode};

use crate::Database;
use crate::graph::GraphStore;
use crate::models::{EdgeRow, NodeRow};

const EDGE_COLUMNS: &str = "id, tail, head, content, is_read, created_at";

const NODE_BY_ID: &str = "SELECT id, username, password, created_at FROM nodes WHERE id = ?1";
const NODE_BY_USERNAME: &str =
    "SELECT id, username, password, created_at FROM nodes WHERE username = ?1";

const INCOMING_EDGE: &str = "SELECT 1 FROM edges WHERE id = ?1 AND head = ?2 AND kind = 'Message'";
const SENT_EDGE: &str = "SELECT 1 FROM edges WHERE id = ?1 AND tail = ?2 AND kind = 'Message'";

impl GraphStore for Database {
    // -- Nodes --

    fn node(&self, id: &GraphId) -> Result<Option<UserNode>> {
        self.with_conn(|conn| query_node(conn, NODE_BY_ID, &id.to_string()))
    }

    fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<UserNode>> {
        let now = Utc::now().trunc_subsecs(6);
        let node = UserNode {
            id: GraphId::generate(),
            username: username.to_string(),
            password: password_hash.to_string(),
            created_at: now,
        };

        let inserted = self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO nodes (id, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    node.id.to_string(),
                    &node.username,
                    &node.password,
                    now.to_rfc3339_opts(SecondsFormat::Micros, true),
                ),
            );
            match result {
                Ok(_) => Ok(true),
                // username is the only UNIQUE column besides the random id
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })?;

        if !inserted {
            debug!("Username {} already taken", node.username);
            return Ok(None);
        }

        debug!("Created user node {} ({})", node.id, node.username);
        Ok(Some(node))
    }

    fn user_by_username(&self, username: &str) -> Result<Option<UserNode>> {
        self.with_conn(|conn| query_node(conn, NODE_BY_USERNAME, username))
    }

    // -- Message edges --

    fn edge(&self, id: &GraphId) -> Result<Option<MessageEdge>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {EDGE_COLUMNS} FROM edges WHERE id = ?1 AND kind = 'Message'");
            let row = conn
                .query_row(&sql, [id.to_string()], edge_row)
                .optional()?;
            row.map(EdgeRow::into_model).transpose()
        })
    }

    fn create_message(&self, from: &GraphId, to: &GraphId, content: &str) -> Result<MessageEdge> {
        let now = Utc::now().trunc_subsecs(6);
        let edge = MessageEdge {
            id: GraphId::generate(),
            tail: *from,
            head: *to,
            content: content.to_string(),
            is_read: false,
            created_at: now,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO edges (id, kind, tail, head, content, is_read, created_at)
                 VALUES (?1, 'Message', ?2, ?3, ?4, 0, ?5)",
                (
                    edge.id.to_string(),
                    from.to_string(),
                    to.to_string(),
                    &edge.content,
                    now.to_rfc3339_opts(SecondsFormat::Micros, true),
                ),
            )?;
            Ok(())
        })?;

        debug!("Message edge {} created: {} -> {}", edge.id, from, to);
        Ok(edge)
    }

    fn incoming_messages(&self, node: &GraphId) -> Result<Vec<MessageEdge>> {
        self.with_conn(|conn| {
            // rowid follows insertion order
            let sql = format!(
                "SELECT {EDGE_COLUMNS} FROM edges WHERE head = ?1 AND kind = 'Message' ORDER BY rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([node.to_string()], edge_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(EdgeRow::into_model).collect()
        })
    }

    fn incoming_message_count(&self, node: &GraphId) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM edges WHERE head = ?1 AND kind = 'Message'",
                [node.to_string()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    fn has_incoming_message(&self, node: &GraphId, msg: &GraphId) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, INCOMING_EDGE, node, msg))
    }

    fn has_sent_message(&self, node: &GraphId, msg: &GraphId) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, SENT_EDGE, node, msg))
    }

    fn set_is_read(&self, msg: &GraphId, is_read: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE edges SET is_read = ?1 WHERE id = ?2 AND kind = 'Message'",
                (is_read, msg.to_string()),
            )?;
            Ok(changed > 0)
        })
    }
}

fn edge_row(row: &Row<'_>) -> rusqlite::Result<EdgeRow> {
    Ok(EdgeRow {
        id: row.get(0)?,
        tail: row.get(1)?,
        head: row.get(2)?,
        content: row.get(3)?,
        is_read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_node(conn: &Connection, sql: &str, value: &str) -> Result<Option<UserNode>> {
    let row = conn
        .query_row(sql, [value], |row| {
            Ok(NodeRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    row.map(NodeRow::into_model).transpose()
}

fn edge_exists(conn: &Connection, sql: &str, node: &GraphId, msg: &GraphId) -> Result<bool> {
    let found = conn
        .query_row(sql, [msg.to_string(), node.to_string()], |_| Ok(()))
        .optional()?;

    Ok(found.is_some())
}
