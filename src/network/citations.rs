// Citation extraction: hyperlinks from one blog's posts to another blog.
//
// Post descriptions are scanned for href attributes (single or double
// quoted). Each target that resolves to a known blog other than the post's
// own becomes a citation. Self-links and links to unknown sites are dropped
// without comment.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex_lite::Regex;
use rusqlite::Connection;
use tracing::info;

use super::domains::DomainMap;
use crate::db::models::{Blog, Citation, Post};
use crate::db::queries;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href=["']([^"']+)["']"#).expect("valid regex"));

/// Every href target in an HTML fragment, in document order.
pub fn extract_links(html: &str) -> Vec<&str> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Cross-blog citations found in the posts' raw descriptions.
pub fn extract_citations(posts: &[Post], domains: &DomainMap) -> Vec<Citation> {
    let mut citations = Vec::new();

    for post in posts {
        let Some(description) = post.description.as_deref() else {
            continue;
        };

        for url in extract_links(description) {
            let Some(target_blog_id) = domains.resolve(url) else {
                continue;
            };
            if target_blog_id == post.blog_id {
                continue;
            }
            citations.push(Citation {
                source_post_id: post.id,
                source_blog_id: post.blog_id,
                target_blog_id,
                target_url: url.to_string(),
            });
        }
    }

    citations
}

/// Extract citations and append them to the citation log.
///
/// Appends only: call `queries::clear_citations` first unless you want the
/// new rows added on top of earlier runs.
pub fn record_citations(conn: &Connection, posts: &[Post], blogs: &[Blog]) -> Result<usize> {
    let domains = DomainMap::from_blogs(blogs);
    let citations = extract_citations(posts, &domains);
    let inserted =
        queries::insert_citations(conn, &citations).context("Failed to append citations")?;

    info!(
        posts = posts.len(),
        known_domains = domains.len(),
        citations = inserted,
        "Recorded citations"
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_both_quote_styles() {
        let html = r#"<a href="https://a.com/x">a</a> <A HREF='https://b.com/y'>b</A>"#;
        assert_eq!(extract_links(html), vec!["https://a.com/x", "https://b.com/y"]);
    }

    #[test]
    fn test_extract_links_none() {
        assert!(extract_links("plain text, no anchors").is_empty());
        assert!(extract_links(r#"<a href="">empty</a>"#).is_empty());
    }
}
