use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::Comment;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    comment     TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_comments_created ON comments(created_at DESC, id DESC);
"#;

/// Open (or create) the comment database. Pass `None` for an in-memory
/// database. The schema is not created here; see [`init_schema`].
pub fn open_database(path: Option<&std::path::Path>) -> Result<Connection> {
    let conn = match path {
        Some(p) => Connection::open(p).context("Failed to open comment database")?,
        None => Connection::open_in_memory().context("Failed to open in-memory database")?,
    };

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )
    .context("Failed to set PRAGMA options")?;

    Ok(conn)
}

/// Create the comments table if it does not exist. Safe to call repeatedly.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Failed to create comment schema")?;
    Ok(())
}

fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        comment: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Insert one comment and return the stored row. `created_at` is the
/// column default, assigned by the database.
pub fn insert_comment(conn: &Connection, text: &str) -> Result<Comment> {
    conn.query_row(
        "INSERT INTO comments (comment) VALUES (?1)
         RETURNING id, comment, created_at",
        params![text],
        row_to_comment,
    )
    .context("Failed to insert comment")
}

/// Fetch a single comment by id.
pub fn get_comment(conn: &Connection, id: i64) -> Result<Option<Comment>> {
    conn.query_row(
        "SELECT id, comment, created_at FROM comments WHERE id = ?1",
        params![id],
        row_to_comment,
    )
    .optional()
    .context("Failed to query comment")
}

/// All comments, newest first. Ties on `created_at` go to the higher id.
pub fn list_comments(conn: &Connection) -> Result<Vec<Comment>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, comment, created_at FROM comments
             ORDER BY created_at DESC, id DESC",
        )
        .context("Failed to prepare list_comments query")?;

    let rows = stmt
        .query_map([], row_to_comment)
        .context("Failed to execute list_comments query")?;

    let mut comments = Vec::new();
    for row in rows {
        comments.push(row.context("Failed to read comment row")?);
    }
    Ok(comments)
}

pub fn count_comments(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
        .context("Failed to count comments")?;
    Ok(count as u64)
}
