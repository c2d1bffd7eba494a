// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   seed import -> SQLite -> Snapshot -> trends / clusters / citations -> report
// against an in-memory database, with no filesystem side effects.

use std::collections::BTreeSet;

use blogpulse::db::models::{NewBlog, NewPost};
use blogpulse::db::{queries, schema};
use blogpulse::network::{compute_centrality, record_citations, CitationGraph};
use blogpulse::pipeline::import::{import_seed, SeedFile, SeedPost};
use blogpulse::pipeline::{build_report, report, ReportOptions, Snapshot};
use blogpulse::topics::emerging::detect_emerging_topics;
use blogpulse::topics::trends::{compute_trends, Period};
use rusqlite::Connection;

fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    schema::create_tables(&conn).unwrap();
    conn
}

fn new_blog(name: &str, domain: &str) -> NewBlog {
    NewBlog {
        name: name.to_string(),
        feed_url: format!("https://{domain}/feed"),
        site_url: Some(format!("https://{domain}")),
    }
}

fn seed_post(domain: &str, slug: &str, title: &str, body: &str, published: &str) -> SeedPost {
    SeedPost {
        feed_url: format!("https://{domain}/feed"),
        post: NewPost {
            title: title.to_string(),
            description: Some(body.to_string()),
            url: format!("https://{domain}/{slug}"),
            published: Some(published.to_string()),
            author: None,
        },
    }
}

/// Four blogs over five months. The compiler blogs start mentioning
/// "webassembly" only in the last three months, and cite each other.
fn seed() -> SeedFile {
    let months = ["2024-01-05", "2024-02-05", "2024-03-05", "2024-04-05", "2024-05-05"];
    let mut posts = Vec::new();

    for (i, date) in months.iter().enumerate() {
        let wasm = if i >= 2 { " webassembly webassembly targets" } else { "" };
        posts.push(seed_post(
            "compilernotes.dev",
            &format!("c{i}"),
            "Rust compiler internals",
            &format!(
                "<p>borrow checker lifetimes{wasm} <a href=\"https://www.typetheory.io/p{i}\">via</a></p>"
            ),
            date,
        ));
        posts.push(seed_post(
            "typetheory.io",
            &format!("t{i}"),
            "Rust lifetimes explained",
            &format!("<p>compiler borrow checker{wasm} <a href='https://compilernotes.dev/c{i}'>ref</a></p>"),
            date,
        ));
        posts.push(seed_post(
            "crumbjournal.blogspot.com",
            &format!("s{i}"),
            "Sourdough starter",
            "<p>flour hydration levain <a href=\"https://ryeloaves.net/\">friends</a></p>",
            date,
        ));
        posts.push(seed_post(
            "ryeloaves.net",
            &format!("r{i}"),
            "Sourdough rye",
            "<p>flour hydration oven <a href=\"https://ryeloaves.net/older\">me</a></p>",
            date,
        ));
    }

    SeedFile {
        blogs: vec![
            new_blog("Compiler Notes", "compilernotes.dev"),
            new_blog("Type Theory", "typetheory.io"),
            new_blog("Crumb Journal", "crumbjournal.blogspot.com"),
            new_blog("Rye Loaves", "ryeloaves.net"),
        ],
        posts,
    }
}

fn loaded_db() -> Connection {
    let conn = test_db();
    let summary = import_seed(&conn, &seed()).unwrap();
    assert_eq!(summary.blogs_added, 4);
    assert_eq!(summary.posts_added, 20);
    conn
}

fn options() -> ReportOptions {
    ReportOptions {
        period: Period::Month,
        max_features: 500,
        clusters: 2,
        seed: 42,
        emerging_window: 3,
    }
}

// ============================================================
// Chain: import -> Snapshot -> trends -> emerging
// ============================================================

#[test]
fn snapshot_reads_everything_imported() {
    let conn = loaded_db();
    let snapshot = Snapshot::load(&conn).unwrap();
    assert_eq!(snapshot.blogs.len(), 4);
    assert_eq!(snapshot.posts.len(), 20);
    assert!(snapshot.posts.iter().all(|p| !p.blog_name.is_empty()));
}

#[test]
fn late_keyword_shows_up_in_late_months_only() {
    let conn = loaded_db();
    let snapshot = Snapshot::load(&conn).unwrap();
    let trends = compute_trends(&snapshot.posts, Period::Month, 500);

    assert_eq!(trends.len(), 5);
    assert!(!trends["2024-01"].contains_key("webassembly"));
    assert!(trends["2024-05"].contains_key("webassembly"));
}

#[test]
fn new_keyword_without_history_is_not_emerging() {
    let conn = loaded_db();
    let snapshot = Snapshot::load(&conn).unwrap();
    let trends = compute_trends(&snapshot.posts, Period::Month, 500);
    let emerging = detect_emerging_topics(&trends, 3);
    assert!(emerging.iter().all(|t| t.keyword != "webassembly"));
}

// ============================================================
// Chain: Snapshot -> citations -> graph -> centrality
// ============================================================

#[test]
fn citations_flow_into_centrality() {
    let conn = loaded_db();
    let snapshot = Snapshot::load(&conn).unwrap();
    let inserted = record_citations(&conn, &snapshot.posts, &snapshot.blogs).unwrap();
    // Each month: compiler <-> type theory, crumb -> rye; rye's self-link is dropped
    assert_eq!(inserted, 15);

    let graph = CitationGraph::load(&conn).unwrap();
    assert_eq!(graph.edge_count(), 3);

    let centrality = compute_centrality(&graph);
    assert_eq!(centrality["Rye Loaves"].in_degree, 1);
    assert_eq!(centrality["Rye Loaves"].out_degree, 0);
    assert_eq!(centrality["Crumb Journal"].in_degree, 0);
    assert!(centrality["Rye Loaves"].pagerank > centrality["Crumb Journal"].pagerank);
}

// ============================================================
// Chain: everything -> AnalysisReport
// ============================================================

#[test]
fn full_report_is_consistent() {
    let conn = loaded_db();
    let snapshot = Snapshot::load(&conn).unwrap();
    record_citations(&conn, &snapshot.posts, &snapshot.blogs).unwrap();

    let analysis = report::run(&conn, &options()).unwrap();
    assert_eq!(analysis.blog_count, 4);
    assert_eq!(analysis.post_count, 20);
    assert_eq!(analysis.trends.len(), 5);
    assert_eq!(analysis.centrality.len(), 4);
    assert_eq!(analysis.citation_edges.len(), 3);

    let similarity = analysis.similarity.as_ref().unwrap();
    assert_eq!(similarity.names.len(), 4);

    assert_eq!(analysis.clusters.len(), 2);
    let groups: Vec<BTreeSet<&str>> = analysis
        .clusters
        .iter()
        .map(|c| c.blogs.iter().map(String::as_str).collect())
        .collect();
    let compilers: BTreeSet<&str> = ["Compiler Notes", "Type Theory"].into_iter().collect();
    let bakers: BTreeSet<&str> = ["Crumb Journal", "Rye Loaves"].into_iter().collect();
    assert!(groups.contains(&compilers), "got {groups:?}");
    assert!(groups.contains(&bakers), "got {groups:?}");
}

#[test]
fn report_serializes_every_section() {
    let conn = loaded_db();
    let analysis = report::run(&conn, &options()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&analysis).unwrap();

    for key in [
        "generated_at",
        "period",
        "trends",
        "emerging",
        "similarity",
        "clusters",
        "citation_edges",
        "centrality",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["period"], "month");
}

#[test]
fn empty_database_gives_empty_report() {
    let conn = test_db();
    let snapshot = Snapshot::load(&conn).unwrap();
    let graph = CitationGraph::load(&conn).unwrap();
    let analysis = build_report(&snapshot, &graph, &options());

    assert!(analysis.trends.is_empty());
    assert!(analysis.emerging.is_empty());
    assert!(analysis.similarity.is_none());
    assert!(analysis.clusters.is_empty());
    assert!(analysis.centrality.is_empty());
    assert_eq!(queries::get_citations(&conn).unwrap().len(), 0);
}
