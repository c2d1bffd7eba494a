// Keyword trends over calendar periods.
//
// Every post is vectorized once (title + stripped description), then posts
// are bucketed by month or ISO week. A keyword's score in a period is the
// sum of its TF-IDF weight across the period's posts divided by how many
// posts the period has. That is an average, so busy months don't dominate quiet
// ones and every score stays within [0, 1].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::normalize::post_document;
use super::tfidf::{TfIdfConfig, TfIdfMatrix, TfIdfVectorizer, Vectorized};
use crate::db::models::Post;

/// period key -> keyword -> average weight. Both levels iterate in
/// ascending key order, which is chronological for both key formats.
pub type TrendTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Calendar granularity for trend buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// `YYYY-MM`
    #[default]
    Month,
    /// ISO 8601 week, `YYYY-Www`
    Week,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Month => "month",
            Period::Week => "week",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "month" => Ok(Period::Month),
            "week" => Ok(Period::Week),
            other => Err(format!("unknown period '{other}' (expected month or week)")),
        }
    }
}

/// Bucket key for a published date, or `None` if the date is missing or
/// can't be read.
///
/// Only the first ten characters (the date part of an ISO timestamp) are
/// looked at.
pub fn period_key(published: Option<&str>, period: Period) -> Option<String> {
    let published = published?;
    if published.is_empty() {
        return None;
    }

    let date_part: String = published.chars().take(10).collect();
    let mut parts = date_part.split('-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;

    match period {
        // The day only has to be a number here; "2024-02-30" still lands in February.
        Period::Month => (1..=12)
            .contains(&month)
            .then(|| format!("{year:04}-{month:02}")),
        Period::Week => {
            let week = NaiveDate::from_ymd_opt(year, month, day)?.iso_week();
            Some(format!("{:04}-W{:02}", week.year(), week.week()))
        }
    }
}

/// Vectorize every post with the post-level configuration.
pub fn extract_keywords(posts: &[Post], max_features: usize) -> Vectorized {
    let documents: Vec<String> = posts
        .iter()
        .map(|p| post_document(&p.title, p.description.as_deref()))
        .collect();
    TfIdfVectorizer::new(TfIdfConfig::for_posts(documents.len(), max_features))
        .fit_transform(&documents)
}

/// Fit keywords over `posts` and aggregate them into a trend table.
///
/// Empty corpora and corpora whose vocabulary prunes to nothing both give
/// an empty table.
pub fn compute_trends(posts: &[Post], period: Period, max_features: usize) -> TrendTable {
    match extract_keywords(posts, max_features) {
        Vectorized::NoCorpus => TrendTable::new(),
        Vectorized::Fitted(matrix) => aggregate_trends(posts, &matrix, period),
    }
}

/// Aggregate an already-fitted matrix (row `i` belongs to `posts[i]`).
pub fn aggregate_trends(posts: &[Post], matrix: &TfIdfMatrix, period: Period) -> TrendTable {
    let mut trends = TrendTable::new();
    let vocabulary = matrix.vocabulary();
    if vocabulary.is_empty() {
        return trends;
    }

    let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut undated = 0usize;
    for (idx, post) in posts.iter().enumerate().take(matrix.len()) {
        match period_key(post.published.as_deref(), period) {
            Some(key) => buckets.entry(key).or_default().push(idx),
            None => undated += 1,
        }
    }

    for (key, indices) in buckets {
        let post_count = indices.len() as f64;
        let mut sums = vec![0.0f64; vocabulary.len()];
        for &idx in &indices {
            for &(term, weight) in matrix.row(idx).entries() {
                sums[term] += weight;
            }
        }

        let scores: BTreeMap<String, f64> = sums
            .into_iter()
            .enumerate()
            .map(|(term, total)| (term, total / post_count))
            .filter(|&(_, score)| score > 0.0)
            .map(|(term, score)| (vocabulary[term].clone(), score))
            .collect();

        if !scores.is_empty() {
            debug!(period = %key, posts = indices.len(), keywords = scores.len(), "Aggregated period");
            trends.insert(key, scores);
        }
    }

    info!(
        periods = trends.len(),
        vocabulary = vocabulary.len(),
        skipped_undated = undated,
        granularity = %period,
        "Computed keyword trends"
    );

    trends
}

/// The `n` highest-scoring keywords of one period, best first.
pub fn top_keywords(scores: &BTreeMap<String, f64>, n: usize) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = scores.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key() {
        assert_eq!(period_key(Some("2024-01-15"), Period::Month).as_deref(), Some("2024-01"));
        assert_eq!(
            period_key(Some("2024-11-03T10:00:00Z"), Period::Month).as_deref(),
            Some("2024-11")
        );
    }

    #[test]
    fn test_week_key_is_iso_week() {
        assert_eq!(period_key(Some("2024-01-15"), Period::Week).as_deref(), Some("2024-W03"));
        // Jan 1 2021 is a Friday, so it belongs to the last ISO week of 2020
        assert_eq!(period_key(Some("2021-01-01"), Period::Week).as_deref(), Some("2020-W53"));
        // Dec 30 2024 is a Monday, the first day of 2025-W01
        assert_eq!(period_key(Some("2024-12-30"), Period::Week).as_deref(), Some("2025-W01"));
    }

    #[test]
    fn test_unparsable_dates() {
        assert_eq!(period_key(None, Period::Month), None);
        assert_eq!(period_key(Some(""), Period::Month), None);
        assert_eq!(period_key(Some("not-a-date"), Period::Month), None);
        assert_eq!(period_key(Some("2024-13-01"), Period::Month), None);
        assert_eq!(period_key(Some("2024-02-30"), Period::Week), None);
        assert_eq!(period_key(Some("2024-02-30"), Period::Month).as_deref(), Some("2024-02"));
        assert_eq!(period_key(Some("Mon, 15 Jan 2024"), Period::Week), None);
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("WEEK".parse::<Period>().unwrap(), Period::Week);
        assert!("year".parse::<Period>().is_err());
    }

    #[test]
    fn test_empty_corpus_gives_empty_table() {
        assert!(compute_trends(&[], Period::Month, 500).is_empty());
    }

    #[test]
    fn test_top_keywords_orders_by_score() {
        let mut scores = BTreeMap::new();
        scores.insert("alpha".to_string(), 0.1);
        scores.insert("beta".to_string(), 0.3);
        scores.insert("gamma".to_string(), 0.3);
        let top = top_keywords(&scores, 2);
        assert_eq!(top, vec![("beta", 0.3), ("gamma", 0.3)]);
    }
}
