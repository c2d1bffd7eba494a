// Blog similarity and clustering over blog-level TF-IDF vectors.

pub mod kmeans;
pub mod similarity;

pub use kmeans::{cluster_blogs, Cluster};
pub use similarity::{find_similar, similarity_matrix, BlogVectors, SimilarBlog, SimilarityMatrix};
