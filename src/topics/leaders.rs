// Which blogs talked about a keyword first, and how often.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::normalize::post_document;
use crate::db::models::Post;

/// Sorts after every real ISO date, so undated blogs land last.
const UNDATED_SENTINEL: &str = "9999";

/// One blog's history with a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadingBlog {
    pub blog_name: String,
    /// Earliest `published` value among matching posts ("" if none had one)
    pub first_mention: String,
    pub mention_count: u32,
}

/// Find every blog mentioning `keyword` (case-insensitive substring of
/// title + stripped description), earliest first.
pub fn find_leading_blogs(posts: &[Post], keyword: &str) -> Vec<LeadingBlog> {
    let needle = keyword.to_lowercase();
    let mut results: Vec<LeadingBlog> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for post in posts {
        let text = post_document(&post.title, post.description.as_deref()).to_lowercase();
        if !text.contains(&needle) {
            continue;
        }

        let slot = *index.entry(post.blog_name.as_str()).or_insert_with(|| {
            results.push(LeadingBlog {
                blog_name: post.blog_name.clone(),
                first_mention: String::new(),
                mention_count: 0,
            });
            results.len() - 1
        });

        let entry = &mut results[slot];
        entry.mention_count += 1;
        let published = post.published.as_deref().unwrap_or("");
        if !published.is_empty()
            && (entry.first_mention.is_empty() || published < entry.first_mention.as_str())
        {
            entry.first_mention = published.to_string();
        }
    }

    // Stable, so blogs with equal dates keep first-seen order
    results.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
    results
}

fn sort_key(blog: &LeadingBlog) -> &str {
    if blog.first_mention.is_empty() {
        UNDATED_SENTINEL
    } else {
        &blog.first_mention
    }
}
