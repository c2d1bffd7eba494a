// Seed import: load blogs and posts from a JSON file.
//
// Stands in for the feed fetcher: the file lists blogs and posts, each post
// naming its blog by feed URL. Re-importing the same file is harmless since
// blogs are keyed by feed URL and posts by URL.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::models::{NewBlog, NewPost};
use crate::db::queries;

/// Top-level shape of a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub blogs: Vec<NewBlog>,
    #[serde(default)]
    pub posts: Vec<SeedPost>,
}

/// A post plus the feed URL of the blog it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPost {
    pub feed_url: String,
    #[serde(flatten)]
    pub post: NewPost,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub blogs_added: usize,
    pub posts_added: usize,
    pub posts_skipped: usize,
}

pub fn read_seed_file(path: &Path) -> Result<SeedFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
    Ok(seed)
}

/// Write a seed into the database.
///
/// Posts whose feed URL matches no blog, and posts whose URL is already
/// stored, are counted as skipped.
pub fn import_seed(conn: &Connection, seed: &SeedFile) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        blogs_added: queries::upsert_blogs(conn, &seed.blogs).context("Failed to insert blogs")?,
        ..Default::default()
    };

    let mut blog_ids: HashMap<&str, Option<i64>> = HashMap::new();
    for entry in &seed.posts {
        let blog_id = match blog_ids.get(entry.feed_url.as_str()) {
            Some(id) => *id,
            None => {
                let id = queries::get_blog_id_by_feed(conn, &entry.feed_url)?;
                blog_ids.insert(entry.feed_url.as_str(), id);
                id
            }
        };

        let Some(blog_id) = blog_id else {
            warn!(feed_url = %entry.feed_url, url = %entry.post.url, "Post for unknown blog, skipping");
            summary.posts_skipped += 1;
            continue;
        };

        if queries::insert_post(conn, blog_id, &entry.post)? {
            summary.posts_added += 1;
        } else {
            summary.posts_skipped += 1;
        }
    }

    info!(
        blogs_added = summary.blogs_added,
        posts_added = summary.posts_added,
        posts_skipped = summary.posts_skipped,
        "Imported seed data"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn seed() -> SeedFile {
        serde_json::from_str(
            r#"{
                "blogs": [
                    {"name": "Alpha", "feed_url": "https://alpha.com/feed", "site_url": "https://alpha.com"}
                ],
                "posts": [
                    {"feed_url": "https://alpha.com/feed", "title": "First", "url": "https://alpha.com/1",
                     "published": "2024-01-05"},
                    {"feed_url": "https://alpha.com/feed", "title": "Second", "url": "https://alpha.com/2"},
                    {"feed_url": "https://nowhere.com/feed", "title": "Orphan", "url": "https://nowhere.com/1"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_import_counts() {
        let conn = test_db();
        let summary = import_seed(&conn, &seed()).unwrap();
        assert_eq!(summary.blogs_added, 1);
        assert_eq!(summary.posts_added, 2);
        assert_eq!(summary.posts_skipped, 1);
    }

    #[test]
    fn test_reimport_adds_nothing() {
        let conn = test_db();
        import_seed(&conn, &seed()).unwrap();
        let again = import_seed(&conn, &seed()).unwrap();
        assert_eq!(again.blogs_added, 0);
        assert_eq!(again.posts_added, 0);
        assert_eq!(again.posts_skipped, 3);
        assert_eq!(queries::get_all_posts(&conn).unwrap().len(), 2);
    }
}
