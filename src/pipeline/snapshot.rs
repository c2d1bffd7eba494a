// Read-once view of the corpus.
//
// Every analysis command works from one consistent read of blogs and posts,
// taken at the start of the run. Nothing downstream goes back to the
// database for corpus rows.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::db::models::{Blog, Post};
use crate::db::queries;

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub blogs: Vec<Blog>,
    pub posts: Vec<Post>,
}

impl Snapshot {
    pub fn load(conn: &Connection) -> Result<Self> {
        let blogs = queries::get_blogs(conn).context("Failed to read blogs")?;
        let posts = queries::get_all_posts(conn).context("Failed to read posts")?;
        info!(blogs = blogs.len(), posts = posts.len(), "Loaded corpus snapshot");
        Ok(Self { blogs, posts })
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
