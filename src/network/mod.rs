// Citation network: who links to whom, and who matters.

pub mod centrality;
pub mod citations;
pub mod domains;
pub mod graph;

pub use centrality::{compute_centrality, rank_by_pagerank, Centrality};
pub use citations::{extract_citations, record_citations};
pub use domains::{domain_from_url, normalize_domain, DomainMap};
pub use graph::{BlogNode, CitationEdge, CitationGraph};
