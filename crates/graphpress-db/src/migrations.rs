use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS nodes (
            id          TEXT PRIMARY KEY,
            kind        TEXT NOT NULL DEFAULT 'User',
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS edges (
            id          TEXT PRIMARY KEY,
            kind        TEXT NOT NULL DEFAULT 'Message',
            tail        TEXT NOT NULL REFERENCES nodes(id),
            head        TEXT NOT NULL REFERENCES nodes(id),
            content     TEXT NOT NULL,
            is_read     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_edges_head
            ON edges(head, kind);

        CREATE INDEX IF NOT EXISTS idx_edges_tail
            ON edges(tail, kind);
        ",
    )?;

    info!("Graph store migrations complete");
    Ok(())
}
