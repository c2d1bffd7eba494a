// Database queries: reads for the analysis snapshot and the citation log.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::Result;
use rusqlite::{params, Connection, Row};

use super::models::{Blog, Citation, NewBlog, NewPost, Post};

// --- Blogs ---

/// Insert blogs, ignoring any whose feed URL is already present.
///
/// Returns how many were newly inserted.
pub fn upsert_blogs(conn: &Connection, blogs: &[NewBlog]) -> Result<usize> {
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO blogs (name, feed_url, site_url) VALUES (?1, ?2, ?3)")?;
    let mut inserted = 0;
    for blog in blogs {
        inserted += stmt.execute(params![blog.name, blog.feed_url, blog.site_url])?;
    }
    Ok(inserted)
}

/// All blogs, ordered by id.
pub fn get_blogs(conn: &Connection) -> Result<Vec<Blog>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, feed_url, site_url, last_fetched, fetch_status
         FROM blogs ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_blog)?;
    let mut blogs = Vec::new();
    for row in rows {
        blogs.push(row?);
    }
    Ok(blogs)
}

/// Look up a blog id by its feed URL.
pub fn get_blog_id_by_feed(conn: &Connection, feed_url: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM blogs WHERE feed_url = ?1",
            params![feed_url],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn row_to_blog(row: &Row<'_>) -> rusqlite::Result<Blog> {
    Ok(Blog {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        feed_url: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        site_url: row.get(3)?,
        last_fetched: row.get(4)?,
        fetch_status: row.get(5)?,
    })
}

// --- Posts ---

/// Insert a single post. Returns false if its URL is already stored.
pub fn insert_post(conn: &Connection, blog_id: i64, post: &NewPost) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO posts (blog_id, title, description, url, published, author)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            blog_id,
            post.title,
            post.description,
            post.url,
            post.published,
            post.author
        ],
    )?;
    Ok(changed > 0)
}

/// All posts with their blog's name joined in, ordered by post id.
pub fn get_all_posts(conn: &Connection) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.blog_id, b.name, p.title, p.description, p.url, p.published, p.author
         FROM posts p JOIN blogs b ON p.blog_id = b.id
         ORDER BY p.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Post {
            id: row.get(0)?,
            blog_id: row.get(1)?,
            blog_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            title: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            description: row.get(4)?,
            url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            published: row.get(6)?,
            author: row.get(7)?,
        })
    })?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

// --- Citations ---

/// Append citation rows to the log.
///
/// This never deduplicates: running extraction twice without
/// `clear_citations` in between doubles every edge weight.
pub fn insert_citations(conn: &Connection, citations: &[Citation]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO citations (source_post_id, source_blog_id, target_blog_id, target_url)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for citation in citations {
            stmt.execute(params![
                citation.source_post_id,
                citation.source_blog_id,
                citation.target_blog_id,
                citation.target_url
            ])?;
        }
    }
    tx.commit()?;
    Ok(citations.len())
}

/// Delete every row of the citation log. Returns how many were removed.
pub fn clear_citations(conn: &Connection) -> Result<usize> {
    let removed = conn.execute("DELETE FROM citations", [])?;
    Ok(removed)
}

/// The full citation log in insertion order.
pub fn get_citations(conn: &Connection) -> Result<Vec<Citation>> {
    let mut stmt = conn.prepare(
        "SELECT source_post_id, source_blog_id, target_blog_id, target_url
         FROM citations ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Citation {
            source_post_id: row.get(0)?,
            source_blog_id: row.get(1)?,
            target_blog_id: row.get(2)?,
            target_url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    })?;

    let mut citations = Vec::new();
    for row in rows {
        citations.push(row?);
    }
    Ok(citations)
}

/// Citation counts per ordered (source blog, target blog) pair.
pub fn citation_edge_counts(conn: &Connection) -> Result<Vec<(i64, i64, u32)>> {
    let mut stmt = conn.prepare(
        "SELECT source_blog_id, target_blog_id, COUNT(*) AS weight
         FROM citations
         GROUP BY source_blog_id, target_blog_id
         ORDER BY source_blog_id, target_blog_id",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(row?);
    }
    Ok(edges)
}

// rusqlite's optional() helper: converts "no rows" into None
use rusqlite::OptionalExtension;
