// Citation graph: directed, weighted, one node per known blog.
//
// An edge A -> B carries the number of citations from A's posts to B.
// Blogs that never cite or get cited are still nodes, so centrality is
// reported for the whole corpus.

use std::collections::HashMap;

use anyhow::{Context, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::models::{Blog, Citation};
use crate::db::queries;

/// Node payload: the blog's id and display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogNode {
    pub id: i64,
    pub name: String,
}

/// One aggregated edge, by blog name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CitationGraph {
    graph: DiGraph<BlogNode, u32>,
    index: HashMap<i64, NodeIndex>,
}

impl CitationGraph {
    /// A graph with every blog as a node and no edges.
    pub fn new(blogs: &[Blog]) -> Self {
        let mut graph = DiGraph::with_capacity(blogs.len(), 0);
        let mut index = HashMap::with_capacity(blogs.len());
        for blog in blogs {
            if index.contains_key(&blog.id) {
                continue;
            }
            let node = graph.add_node(BlogNode {
                id: blog.id,
                name: blog.name.clone(),
            });
            index.insert(blog.id, node);
        }
        Self { graph, index }
    }

    /// Build from individual citation rows, one unit of weight per row.
    pub fn from_citations(blogs: &[Blog], citations: &[Citation]) -> Self {
        let mut graph = Self::new(blogs);
        for citation in citations {
            graph.add_citations(citation.source_blog_id, citation.target_blog_id, 1);
        }
        graph
    }

    /// Build from already aggregated `(source, target, count)` triples.
    pub fn from_edge_counts(blogs: &[Blog], counts: &[(i64, i64, u32)]) -> Self {
        let mut graph = Self::new(blogs);
        for &(source, target, count) in counts {
            graph.add_citations(source, target, count);
        }
        graph
    }

    /// Blogs and stored citations from the database.
    pub fn load(conn: &Connection) -> Result<Self> {
        let blogs = queries::get_blogs(conn).context("Failed to load blogs for citation graph")?;
        let counts =
            queries::citation_edge_counts(conn).context("Failed to load citation edges")?;
        let graph = Self::from_edge_counts(&blogs, &counts);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Loaded citation graph"
        );

        Ok(graph)
    }

    /// Add `count` citations from `source` to `target`.
    ///
    /// Self-citations and unknown blog ids are ignored; returns whether
    /// anything was added.
    pub fn add_citations(&mut self, source: i64, target: i64, count: u32) -> bool {
        if source == target || count == 0 {
            return false;
        }
        let (Some(&from), Some(&to)) = (self.index.get(&source), self.index.get(&target)) else {
            warn!(source, target, "Citation between unknown blogs, skipping");
            return false;
        };

        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] += count,
            None => {
                self.graph.add_edge(from, to, count);
            }
        }
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Total citations from one blog to another, if any.
    pub fn edge_weight(&self, source: i64, target: i64) -> Option<u32> {
        let from = *self.index.get(&source)?;
        let to = *self.index.get(&target)?;
        self.graph.find_edge(from, to).map(|edge| self.graph[edge])
    }

    /// Number of distinct blogs citing this one.
    pub fn in_degree(&self, blog_id: i64) -> usize {
        self.degree(blog_id, Direction::Incoming)
    }

    /// Number of distinct blogs this one cites.
    pub fn out_degree(&self, blog_id: i64) -> usize {
        self.degree(blog_id, Direction::Outgoing)
    }

    fn degree(&self, blog_id: i64, direction: Direction) -> usize {
        self.index
            .get(&blog_id)
            .map(|&node| self.graph.edges_directed(node, direction).count())
            .unwrap_or(0)
    }

    /// Every edge by blog name, sorted by source then target.
    pub fn edges(&self) -> Vec<CitationEdge> {
        let mut edges: Vec<CitationEdge> = self
            .graph
            .edge_references()
            .map(|edge| CitationEdge {
                source: self.graph[edge.source()].name.clone(),
                target: self.graph[edge.target()].name.clone(),
                weight: *edge.weight(),
            })
            .collect();
        edges.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.target.cmp(&b.target)));
        edges
    }

    /// Underlying petgraph graph, for the centrality algorithms.
    pub fn inner(&self) -> &DiGraph<BlogNode, u32> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog(id: i64, name: &str) -> Blog {
        Blog {
            id,
            name: name.to_string(),
            feed_url: format!("https://{name}.example/feed"),
            site_url: None,
            last_fetched: None,
            fetch_status: None,
        }
    }

    fn citation(source: i64, target: i64) -> Citation {
        Citation {
            source_post_id: 0,
            source_blog_id: source,
            target_blog_id: target,
            target_url: String::new(),
        }
    }

    #[test]
    fn test_every_blog_is_a_node() {
        let blogs = vec![blog(1, "a"), blog(2, "b"), blog(3, "c")];
        let graph = CitationGraph::from_citations(&blogs, &[]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_repeated_citations_aggregate_into_weight() {
        let blogs = vec![blog(1, "a"), blog(2, "b")];
        let graph = CitationGraph::from_citations(
            &blogs,
            &[citation(1, 2), citation(1, 2), citation(1, 2), citation(2, 1)],
        );
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge_weight(1, 2), Some(3));
        assert_eq!(graph.edge_weight(2, 1), Some(1));
        assert_eq!(graph.out_degree(1), 1);
    }

    #[test]
    fn test_self_and_unknown_citations_ignored() {
        let blogs = vec![blog(1, "a"), blog(2, "b")];
        let graph = CitationGraph::from_citations(&blogs, &[citation(1, 1), citation(1, 99)]);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.edge_weight(1, 1), None);
    }

    #[test]
    fn test_degrees_count_distinct_neighbours() {
        let blogs = vec![blog(1, "a"), blog(2, "b"), blog(3, "c")];
        let graph = CitationGraph::from_edge_counts(&blogs, &[(1, 2, 4), (1, 3, 1), (2, 1, 2)]);
        assert_eq!(graph.out_degree(1), 2);
        assert_eq!(graph.in_degree(1), 1);
        assert_eq!(graph.in_degree(3), 1);
        assert_eq!(graph.out_degree(3), 0);
        assert_eq!(graph.in_degree(42), 0);
    }

    #[test]
    fn test_edges_sorted_by_name() {
        let blogs = vec![blog(1, "zeta"), blog(2, "alpha")];
        let graph = CitationGraph::from_edge_counts(&blogs, &[(1, 2, 1), (2, 1, 5)]);
        let edges = graph.edges();
        assert_eq!(edges[0].source, "alpha");
        assert_eq!(edges[0].weight, 5);
        assert_eq!(edges[1].source, "zeta");
    }
}
