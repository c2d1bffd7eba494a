// Centrality over the citation graph: PageRank, betweenness, degree.
//
// PageRank follows citation weights: a blog that cites B three times and C
// once passes three quarters of its rank to B. Blogs that cite nobody
// spread their rank evenly over every blog. Betweenness treats edge weights
// as path lengths, so heavy citation links count as long hops.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::graph::CitationGraph;

pub const DAMPING: f64 = 0.85;
pub const PAGERANK_MAX_ITER: usize = 100;
/// Per-node convergence tolerance; the L1 threshold is `n * PAGERANK_TOL`.
pub const PAGERANK_TOL: f64 = 1e-6;

/// Centrality measures for one blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centrality {
    pub pagerank: f64,
    pub betweenness: f64,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// Centrality for every blog in the graph, keyed by blog name.
pub fn compute_centrality(graph: &CitationGraph) -> BTreeMap<String, Centrality> {
    let g = graph.inner();
    if g.node_count() == 0 {
        return BTreeMap::new();
    }

    let ranks = pagerank(graph);
    let between = betweenness(graph);

    let result: BTreeMap<String, Centrality> = g
        .node_indices()
        .map(|node| {
            (
                g[node].name.clone(),
                Centrality {
                    pagerank: ranks[node.index()],
                    betweenness: between[node.index()],
                    in_degree: g.edges_directed(node, Direction::Incoming).count(),
                    out_degree: g.edges_directed(node, Direction::Outgoing).count(),
                },
            )
        })
        .collect();

    info!(
        blogs = result.len(),
        edges = g.edge_count(),
        "Computed citation centrality"
    );

    result
}

/// Blogs ordered by PageRank, highest first; ties by name.
pub fn rank_by_pagerank(centrality: &BTreeMap<String, Centrality>) -> Vec<(&str, &Centrality)> {
    let mut ranked: Vec<(&str, &Centrality)> =
        centrality.iter().map(|(name, c)| (name.as_str(), c)).collect();
    ranked.sort_by(|a, b| {
        b.1.pagerank
            .partial_cmp(&a.1.pagerank)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked
}

/// Weighted PageRank by power iteration, indexed by node index.
pub fn pagerank(graph: &CitationGraph) -> Vec<f64> {
    let g = graph.inner();
    let n = g.node_count();
    if n == 0 {
        return Vec::new();
    }

    let uniform = 1.0 / n as f64;
    let out_weight: Vec<f64> = g
        .node_indices()
        .map(|node| g.edges(node).map(|e| f64::from(*e.weight())).sum())
        .collect();
    let dangling: Vec<usize> = (0..n).filter(|&i| out_weight[i] == 0.0).collect();

    let mut rank = vec![uniform; n];
    for iteration in 0..PAGERANK_MAX_ITER {
        let previous = rank;
        rank = vec![0.0; n];

        let dangling_mass: f64 = DAMPING * dangling.iter().map(|&i| previous[i]).sum::<f64>();
        for edge in g.edge_references() {
            let from = edge.source().index();
            let share = f64::from(*edge.weight()) / out_weight[from];
            rank[edge.target().index()] += DAMPING * previous[from] * share;
        }
        for r in rank.iter_mut() {
            *r += (dangling_mass + (1.0 - DAMPING)) * uniform;
        }

        let err: f64 = rank.iter().zip(&previous).map(|(a, b)| (a - b).abs()).sum();
        if err < n as f64 * PAGERANK_TOL {
            debug!(iterations = iteration + 1, "PageRank converged");
            return rank;
        }
    }

    warn!(max_iter = PAGERANK_MAX_ITER, "PageRank did not converge");
    rank
}

/// Brandes betweenness with Dijkstra over citation weights, normalized for
/// directed graphs. Indexed by node index.
pub fn betweenness(graph: &CitationGraph) -> Vec<f64> {
    let g = graph.inner();
    let n = g.node_count();
    let mut centrality = vec![0.0; n];

    for source in g.node_indices() {
        let (mut order, preds, sigma) = shortest_paths(graph, source);

        let mut delta = vec![0.0; n];
        while let Some(w) = order.pop() {
            let coeff = (1.0 + delta[w]) / sigma[w];
            for &v in &preds[w] {
                delta[v] += sigma[v] * coeff;
            }
            if w != source.index() {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for c in centrality.iter_mut() {
            *c *= scale;
        }
    }
    centrality
}

/// Single-source Dijkstra recording visit order, shortest-path predecessors
/// and shortest-path counts.
fn shortest_paths(graph: &CitationGraph, source: NodeIndex) -> (Vec<usize>, Vec<Vec<usize>>, Vec<f64>) {
    let g = graph.inner();
    let n = g.node_count();

    let mut order = Vec::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut settled: Vec<Option<u64>> = vec![None; n];
    let mut seen: Vec<Option<u64>> = vec![None; n];

    let s = source.index();
    sigma[s] = 1.0;
    seen[s] = Some(0);

    // (distance, push counter, predecessor, node); the counter keeps pops
    // in insertion order among equal distances.
    let mut heap = BinaryHeap::new();
    let mut counter = 0u64;
    heap.push(Reverse((0u64, counter, s, s)));

    while let Some(Reverse((dist, _, pred, v))) = heap.pop() {
        if settled[v].is_some() {
            continue;
        }
        if v != s {
            sigma[v] += sigma[pred];
        }
        settled[v] = Some(dist);
        order.push(v);

        for edge in g.edges(NodeIndex::new(v)) {
            let w = edge.target().index();
            let candidate = dist + u64::from(*edge.weight());
            if settled[w].is_none() && seen[w].is_none_or(|d| candidate < d) {
                seen[w] = Some(candidate);
                counter += 1;
                heap.push(Reverse((candidate, counter, v, w)));
                sigma[w] = 0.0;
                preds[w] = vec![v];
            } else if seen[w] == Some(candidate) {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    (order, preds, sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Blog;

    fn blogs(names: &[&str]) -> Vec<Blog> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Blog {
                id: i as i64 + 1,
                name: name.to_string(),
                feed_url: format!("https://{name}.example/feed"),
                site_url: None,
                last_fetched: None,
                fetch_status: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_graph() {
        let graph = CitationGraph::new(&[]);
        assert!(compute_centrality(&graph).is_empty());
    }

    #[test]
    fn test_degree_example() {
        // A -> B, A -> C, B -> A
        let graph = CitationGraph::from_edge_counts(&blogs(&["A", "B", "C"]), &[(1, 2, 1), (1, 3, 1), (2, 1, 1)]);
        let c = compute_centrality(&graph);
        assert_eq!(c["A"].in_degree, 1);
        assert_eq!(c["A"].out_degree, 2);
        assert_eq!(c["B"].in_degree, 1);
        assert_eq!(c["B"].out_degree, 1);
        assert_eq!(c["C"].in_degree, 1);
        assert_eq!(c["C"].out_degree, 0);
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        let graph = CitationGraph::from_edge_counts(
            &blogs(&["A", "B", "C", "D"]),
            &[(1, 2, 3), (1, 3, 1), (2, 1, 1), (3, 2, 2)],
        );
        let total: f64 = compute_centrality(&graph).values().map(|c| c.pagerank).sum();
        assert!((total - 1.0).abs() < 1e-6, "PageRank total should be 1.0, got {total}");
    }

    #[test]
    fn test_pagerank_uniform_without_edges() {
        let graph = CitationGraph::new(&blogs(&["A", "B", "C", "D"]));
        for rank in pagerank(&graph) {
            assert!((rank - 0.25).abs() < 1e-9, "expected 0.25, got {rank}");
        }
    }

    #[test]
    fn test_most_cited_ranks_highest() {
        let graph = CitationGraph::from_edge_counts(
            &blogs(&["hub", "a", "b", "c"]),
            &[(2, 1, 1), (3, 1, 1), (4, 1, 1)],
        );
        let c = compute_centrality(&graph);
        let ranked = rank_by_pagerank(&c);
        assert_eq!(ranked[0].0, "hub");
    }

    #[test]
    fn test_betweenness_of_chain_middle() {
        // A -> B -> C: B lies on the only A..C path.
        let graph = CitationGraph::from_edge_counts(&blogs(&["A", "B", "C"]), &[(1, 2, 1), (2, 3, 1)]);
        let c = compute_centrality(&graph);
        assert!((c["B"].betweenness - 0.5).abs() < 1e-12, "got {}", c["B"].betweenness);
        assert_eq!(c["A"].betweenness, 0.0);
        assert_eq!(c["C"].betweenness, 0.0);
    }

    #[test]
    fn test_betweenness_prefers_lighter_path() {
        // A -> C directly with weight 5, or A -> B -> C with total weight 2.
        let graph = CitationGraph::from_edge_counts(
            &blogs(&["A", "B", "C"]),
            &[(1, 3, 5), (1, 2, 1), (2, 3, 1)],
        );
        let between = betweenness(&graph);
        assert!(between[1] > 0.0);
    }

    #[test]
    fn test_betweenness_splits_equal_paths() {
        // A -> B -> D and A -> C -> D, equal length.
        let graph = CitationGraph::from_edge_counts(
            &blogs(&["A", "B", "C", "D"]),
            &[(1, 2, 1), (1, 3, 1), (2, 4, 1), (3, 4, 1)],
        );
        let between = betweenness(&graph);
        // Each middle node carries half of one pair out of (n-1)(n-2) = 6.
        assert!((between[1] - 0.5 / 6.0).abs() < 1e-12, "got {}", between[1]);
        assert!((between[1] - between[2]).abs() < 1e-12);
    }
}
