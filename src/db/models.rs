// Data models: Rust structs that map to database rows.
//
// These are the types that flow through the analysis. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly. Nullable columns are `Option`s; nothing downstream
// works with untyped rows.

use serde::{Deserialize, Serialize};

/// A subscribed blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub name: String,
    pub feed_url: String,
    /// Home page URL; its domain is what citations resolve against
    pub site_url: Option<String>,
    pub last_fetched: Option<String>,
    pub fetch_status: Option<String>,
}

/// A single post, joined with its owning blog's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub blog_id: i64,
    pub blog_name: String,
    pub title: String,
    /// Raw feed description, usually HTML
    pub description: Option<String>,
    pub url: String,
    /// ISO date, possibly with a time component
    pub published: Option<String>,
    pub author: Option<String>,
}

/// One row of the citation log: a post on one blog linking to another blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_post_id: i64,
    pub source_blog_id: i64,
    pub target_blog_id: i64,
    pub target_url: String,
}

/// A blog as supplied by the feed list, before it has an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlog {
    pub name: String,
    pub feed_url: String,
    pub site_url: Option<String>,
}

/// A post as supplied by a feed entry, before it has an id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}
