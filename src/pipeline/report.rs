// Full analysis report: every product from one snapshot.
//
// Trends, emerging topics, blog similarity, clusters, and citation
// centrality, bundled into a single serializable struct for `report`.

use std::collections::BTreeMap;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use super::snapshot::Snapshot;
use crate::clusters::{cluster_blogs, similarity_matrix, BlogVectors, Cluster, SimilarityMatrix};
use crate::config::Config;
use crate::network::{compute_centrality, Centrality, CitationEdge, CitationGraph};
use crate::topics::emerging::{detect_emerging_topics, EmergingTopic};
use crate::topics::trends::{compute_trends, Period, TrendTable};

/// Knobs for a report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub period: Period,
    pub max_features: usize,
    pub clusters: usize,
    pub seed: u64,
    pub emerging_window: usize,
}

impl ReportOptions {
    pub fn from_config(config: &Config, period: Period) -> Self {
        Self {
            period,
            max_features: config.max_features,
            clusters: config.clusters,
            seed: config.seed,
            emerging_window: config.emerging_window,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// RFC 3339 UTC timestamp
    pub generated_at: String,
    pub period: Period,
    pub blog_count: usize,
    pub post_count: usize,
    pub trends: TrendTable,
    pub emerging: Vec<EmergingTopic>,
    /// Absent when there are no posts to build blog vectors from
    pub similarity: Option<SimilarityMatrix>,
    pub clusters: Vec<Cluster>,
    pub citation_edges: Vec<CitationEdge>,
    pub centrality: BTreeMap<String, Centrality>,
}

/// Run every analysis over an in-memory snapshot and citation graph.
pub fn build_report(snapshot: &Snapshot, graph: &CitationGraph, options: &ReportOptions) -> AnalysisReport {
    let trends = compute_trends(&snapshot.posts, options.period, options.max_features);
    let emerging = detect_emerging_topics(&trends, options.emerging_window);

    let vectors = BlogVectors::build(&snapshot.posts, options.max_features);
    let similarity = vectors.as_ref().map(similarity_matrix);
    let clusters = vectors
        .as_ref()
        .map(|v| cluster_blogs(v, options.clusters, options.seed))
        .unwrap_or_default();

    let report = AnalysisReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        period: options.period,
        blog_count: snapshot.blogs.len(),
        post_count: snapshot.posts.len(),
        trends,
        emerging,
        similarity,
        clusters,
        citation_edges: graph.edges(),
        centrality: compute_centrality(graph),
    };

    info!(
        periods = report.trends.len(),
        emerging = report.emerging.len(),
        clusters = report.clusters.len(),
        citation_edges = report.citation_edges.len(),
        "Built analysis report"
    );

    report
}

/// Load the snapshot and stored citation graph, then build the report.
pub fn run(conn: &Connection, options: &ReportOptions) -> Result<AnalysisReport> {
    let snapshot = Snapshot::load(conn)?;
    let graph = CitationGraph::load(conn)?;
    Ok(build_report(&snapshot, &graph, options))
}
