// Database schema: table creation and migrations.
//
// Same version-tracking approach as any future migration will need: a
// `schema_version` table records which versions have been applied.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent: safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per subscribed blog; feed_url is the natural key
        CREATE TABLE IF NOT EXISTS blogs (
            id INTEGER PRIMARY KEY,
            name TEXT,
            feed_url TEXT UNIQUE,
            site_url TEXT,
            last_fetched TEXT,
            fetch_status TEXT
        );

        -- Posts are immutable once inserted; url is globally unique
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            blog_id INTEGER REFERENCES blogs(id),
            title TEXT,
            description TEXT,              -- raw, possibly HTML
            url TEXT UNIQUE,
            published TEXT,                -- ISO date, optionally with time
            author TEXT
        );

        -- Append-only citation log written by citation extraction
        CREATE TABLE IF NOT EXISTS citations (
            id INTEGER PRIMARY KEY,
            source_post_id INTEGER REFERENCES posts(id),
            source_blog_id INTEGER REFERENCES blogs(id),
            target_blog_id INTEGER REFERENCES blogs(id),
            target_url TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_posts_blog_id ON posts(blog_id);
        CREATE INDEX IF NOT EXISTS idx_posts_published ON posts(published);
        CREATE INDEX IF NOT EXISTS idx_citations_source_blog_id ON citations(source_blog_id);
        CREATE INDEX IF NOT EXISTS idx_citations_target_blog_id ON citations(target_blog_id);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
