// Blog-level vectors and cosine similarity.
//
// Each blog becomes one document: all of its posts' title + stripped
// description, joined. Those documents get their own vocabulary, separate
// from the post-level trend vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::models::Post;
use crate::topics::normalize::post_document;
use crate::topics::tfidf::{TfIdfConfig, TfIdfMatrix, TfIdfVectorizer};

/// One TF-IDF row per blog, blogs ordered by name.
#[derive(Debug, Clone)]
pub struct BlogVectors {
    names: Vec<String>,
    matrix: TfIdfMatrix,
}

impl BlogVectors {
    /// Build blog documents from `posts` and vectorize them.
    ///
    /// Returns `None` when there are no posts (and so no blogs to compare).
    pub fn build(posts: &[Post], max_features: usize) -> Option<Self> {
        let mut docs: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for post in posts {
            docs.entry(post.blog_name.as_str())
                .or_default()
                .push(post_document(&post.title, post.description.as_deref()));
        }

        let names: Vec<String> = docs.keys().map(|n| n.to_string()).collect();
        let documents: Vec<String> = docs.values().map(|parts| parts.join(" ")).collect();

        let matrix = TfIdfVectorizer::new(TfIdfConfig::for_blogs(max_features))
            .fit_transform(&documents)
            .into_matrix()?;

        info!(
            blogs = names.len(),
            vocabulary = matrix.vocabulary().len(),
            "Built blog vectors"
        );

        Some(Self { names, matrix })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn matrix(&self) -> &TfIdfMatrix {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Symmetric pairwise cosine similarity between blogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    /// Row/column order
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// A blog similar to the one asked about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarBlog {
    pub name: String,
    pub similarity_score: f64,
}

/// Cosine similarity for every pair of blogs. Self-similarity is 1.0 even
/// for a blog with no surviving terms.
pub fn similarity_matrix(vectors: &BlogVectors) -> SimilarityMatrix {
    let n = vectors.len();
    let rows = vectors.matrix().rows();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let sim = rows[i].dot(&rows[j]).clamp(0.0, 1.0);
            values[i][j] = sim;
            values[j][i] = sim;
        }
    }

    SimilarityMatrix {
        names: vectors.names().to_vec(),
        values,
    }
}

/// The `top_n` blogs most similar to `blog_name`, best first, never
/// including the blog itself. Unknown names give an empty list.
pub fn find_similar(matrix: &SimilarityMatrix, blog_name: &str, top_n: usize) -> Vec<SimilarBlog> {
    let Some(idx) = matrix.index_of(blog_name) else {
        return Vec::new();
    };

    let row = &matrix.values[idx];
    let mut ranked: Vec<usize> = (0..row.len()).filter(|&i| i != idx).collect();
    ranked.sort_by(|&a, &b| {
        row[b]
            .partial_cmp(&row[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    ranked
        .into_iter()
        .take(top_n)
        .map(|i| SimilarBlog {
            name: matrix.names[i].clone(),
            similarity_score: row[i],
        })
        .collect()
}
