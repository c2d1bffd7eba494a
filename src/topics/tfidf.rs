// TF-IDF vectorization over a corpus of documents.
//
// Each document is lower-cased, tokenized with a "starts with a letter, at
// least three characters" pattern, stripped of English stop words (from the
// `stop-words` crate), and expanded into n-grams. Terms are pruned by
// document frequency, capped to the most frequent `max_features`, and
// weighted with raw term count times smoothed IDF:
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// Every document vector is then L2-normalized, so each weight is in [0, 1].
// There's no randomness anywhere: the same documents and config always give
// the same vocabulary and weights.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use stop_words::{get, LANGUAGE};
use tracing::debug;

// Word boundaries are Unicode-aware, so accented words like "café" give no
// token at all rather than an ASCII fragment.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z][a-zA-Z0-9]{2,}\b").expect("valid regex"));

static STOP_WORDS: LazyLock<HashSet<String>> =
    LazyLock::new(|| get(LANGUAGE::English).into_iter().collect());

/// Vectorizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TfIdfConfig {
    /// Keep at most this many terms (by total corpus count). `None` = no cap.
    pub max_features: Option<usize>,
    /// Drop terms found in fewer than this many documents.
    pub min_df: usize,
    /// Drop terms found in more than this fraction of documents.
    pub max_df: f64,
    /// Inclusive n-gram span, e.g. (1, 2) for unigrams and bigrams.
    pub ngram_range: (usize, usize),
}

impl TfIdfConfig {
    /// Per-post keyword extraction.
    ///
    /// The min-df floor of 3 drops to the corpus size for tiny corpora, and
    /// terms in more than 70% of posts are treated as boilerplate.
    pub fn for_posts(corpus_size: usize, max_features: usize) -> Self {
        Self {
            max_features: Some(max_features),
            min_df: corpus_size.min(3),
            max_df: 0.7,
            ngram_range: (1, 2),
        }
    }

    /// Per-blog documents. Blog counts are small, so no df pruning at all.
    pub fn for_blogs(max_features: usize) -> Self {
        Self {
            max_features: Some(max_features),
            min_df: 1,
            max_df: 1.0,
            ngram_range: (1, 1),
        }
    }
}

/// Outcome of fitting a corpus.
#[derive(Debug, Clone)]
pub enum Vectorized {
    /// There were no documents at all. Callers report "no results".
    NoCorpus,
    /// One vector per input document, in input order. The vocabulary may
    /// still be empty if pruning removed every term.
    Fitted(TfIdfMatrix),
}

impl Vectorized {
    /// The fitted matrix, if there was a corpus.
    pub fn into_matrix(self) -> Option<TfIdfMatrix> {
        match self {
            Vectorized::NoCorpus => None,
            Vectorized::Fitted(matrix) => Some(matrix),
        }
    }
}

/// A sparse, L2-normalized term vector: `(term index, weight)` pairs sorted
/// by term index, zero weights omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(usize, f64)>,
}

impl TermVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn get(&self, term: usize) -> f64 {
        self.entries
            .binary_search_by_key(&term, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product of two sparse vectors (cosine similarity, since both are
    /// unit length or zero).
    pub fn dot(&self, other: &TermVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Fitted vocabulary plus one TermVector per document.
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    vocabulary: Vec<String>,
    rows: Vec<TermVector>,
}

impl TfIdfMatrix {
    /// Terms in column order (alphabetical).
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn rows(&self) -> &[TermVector] {
        &self.rows
    }

    pub fn row(&self, doc: usize) -> &TermVector {
        &self.rows[doc]
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn weight(&self, doc: usize, term: usize) -> f64 {
        self.rows[doc].get(term)
    }

    /// A row expanded to a full-length vector over the vocabulary.
    pub fn dense_row(&self, doc: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.vocabulary.len()];
        for &(term, weight) in self.rows[doc].entries() {
            dense[term] = weight;
        }
        dense
    }
}

/// TF-IDF vectorizer over an ordered sequence of documents.
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
}

impl TfIdfVectorizer {
    pub fn new(config: TfIdfConfig) -> Self {
        Self { config }
    }

    /// Fit the vocabulary on `documents` and return their vectors.
    pub fn fit_transform(&self, documents: &[String]) -> Vectorized {
        if documents.is_empty() {
            return Vectorized::NoCorpus;
        }

        let n_docs = documents.len();
        let doc_counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| count_terms(&self.analyze(doc)))
            .collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut total: HashMap<&str, usize> = HashMap::new();
        for counts in &doc_counts {
            for (term, &count) in counts {
                *df.entry(term.as_str()).or_insert(0) += 1;
                *total.entry(term.as_str()).or_insert(0) += count;
            }
        }

        let max_doc_count = self.config.max_df * n_docs as f64;
        let mut kept: Vec<&str> = df
            .iter()
            .filter(|&(_, &d)| d >= self.config.min_df && (d as f64) <= max_doc_count)
            .map(|(&term, _)| term)
            .collect();

        if let Some(limit) = self.config.max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| total[b].cmp(&total[a]).then_with(|| a.cmp(b)));
                kept.truncate(limit);
            }
        }
        kept.sort_unstable();

        let vocabulary: Vec<String> = kept.iter().map(|t| t.to_string()).collect();
        let index: HashMap<&str, usize> = kept.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| ((1.0 + n_docs as f64) / (1.0 + df[t] as f64)).ln() + 1.0)
            .collect();

        let rows: Vec<TermVector> = doc_counts
            .iter()
            .map(|counts| {
                let mut entries: Vec<(usize, f64)> = counts
                    .iter()
                    .filter_map(|(term, &count)| {
                        index
                            .get(term.as_str())
                            .map(|&i| (i, count as f64 * idf[i]))
                    })
                    .collect();
                entries.sort_unstable_by_key(|&(i, _)| i);

                let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for entry in &mut entries {
                        entry.1 /= norm;
                    }
                }
                TermVector { entries }
            })
            .collect();

        debug!(
            documents = n_docs,
            candidate_terms = df.len(),
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vocabulary"
        );

        Vectorized::Fitted(TfIdfMatrix { vocabulary, rows })
    }

    /// Lower-case, tokenize, drop stop words, and expand to n-grams.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !STOP_WORDS.contains(*t))
            .collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().map(|t| t.to_string()));
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }
}

fn count_terms(terms: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term.clone()).or_insert(0) += 1;
    }
    counts
}
