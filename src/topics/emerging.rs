// Emerging-topic detection.
//
// Splits the trend table's periods into a recent window (the last `window`
// periods) and everything before it. A keyword is emerging when both
// averages are positive and the recent one is more than double the
// historical one. Periods where a keyword doesn't appear count as zero.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::trends::TrendTable;

/// Default number of recent periods compared against history.
pub const DEFAULT_WINDOW: usize = 3;

/// Recent/historical ratio a keyword must exceed to count as emerging.
pub const ACCELERATION_THRESHOLD: f64 = 2.0;

/// A keyword whose recent average is accelerating past its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingTopic {
    pub keyword: String,
    /// Average score over the recent window (rounded to 6 places)
    pub recent_score: f64,
    /// Average score over all earlier periods (rounded to 6 places)
    pub historical_avg: f64,
    /// recent / historical (rounded to 2 places)
    pub acceleration: f64,
}

/// Flag keywords accelerating in the last `window` periods.
///
/// Needs at least `window + 1` periods; with less history the result is
/// empty. Output is sorted by acceleration descending, then keyword.
pub fn detect_emerging_topics(trends: &TrendTable, window: usize) -> Vec<EmergingTopic> {
    if window == 0 || trends.len() < window + 1 {
        return Vec::new();
    }

    let periods: Vec<&String> = trends.keys().collect();
    let split = periods.len() - window;
    let (historical, recent) = periods.split_at(split);

    let keywords: BTreeSet<&String> = trends.values().flat_map(|scores| scores.keys()).collect();

    let average = |keys: &[&String], keyword: &String| -> f64 {
        let total: f64 = keys
            .iter()
            .map(|p| trends[*p].get(keyword).copied().unwrap_or(0.0))
            .sum();
        total / keys.len() as f64
    };

    let mut emerging = Vec::new();
    for keyword in keywords {
        let recent_avg = average(recent, keyword);
        let historical_avg = average(historical, keyword);

        if historical_avg > 0.0 && recent_avg > 0.0 {
            let acceleration = recent_avg / historical_avg;
            if acceleration > ACCELERATION_THRESHOLD {
                emerging.push(EmergingTopic {
                    keyword: keyword.clone(),
                    recent_score: round_to(recent_avg, 6),
                    historical_avg: round_to(historical_avg, 6),
                    acceleration: round_to(acceleration, 2),
                });
            }
        }
    }

    emerging.sort_by(|a, b| {
        b.acceleration
            .partial_cmp(&a.acceleration)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    info!(
        periods = periods.len(),
        window,
        emerging = emerging.len(),
        "Detected emerging topics"
    );

    emerging
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
