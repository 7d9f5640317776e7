use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// Open (or create) the SQLite store at `path` and make sure the schema
/// exists. The parent directory is created on demand.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database '{}'", path.display()))?;
    ensure_schema(&conn)?;
    debug!(path = %path.display(), "opened course store");
    Ok(conn)
}

/// Run lazy migrations on a live connection. The function also toggles
/// `PRAGMA foreign_keys = ON` so prerequisite rows cascade with their course
/// the same way in tests and production runs.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_number TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create courses table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_prerequisites (
            course_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            prerequisite TEXT NOT NULL,
            PRIMARY KEY (course_id, position),
            FOREIGN KEY(course_id) REFERENCES courses(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create course_prerequisites table")?;

    Ok(())
}
