// Database layer: SQLite storage for blogs, posts, and the citation log.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever BLOGPULSE_DB_PATH points
// (defaults to ./data/blogpulse.db). Feed fetching writes blogs and posts;
// the analysis core only reads them, apart from appending citation rows.

pub mod models;
pub mod queries;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the database and run migrations.
///
/// This is the main entry point: called by `blogpulse init` and `import`.
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    configure(&conn)?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `blogpulse init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    configure(&conn)?;

    Ok(conn)
}

/// WAL for concurrent readers while a fetch is writing; foreign keys so
/// posts and citations can't point at missing blogs.
fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}
