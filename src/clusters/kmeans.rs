// k-means over blog TF-IDF vectors.
//
// k-means++ seeding, Lloyd iterations, several restarts keeping the lowest
// inertia. All randomness comes from one StdRng seeded from the configured
// seed, so the same corpus and seed always yield the same clusters.
//
// Empty clusters are refilled with the point farthest from its centroid
// (taken from a cluster that can spare one), so with k <= n every cluster
// ends up with at least one member.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::similarity::BlogVectors;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Terms shown in a cluster label.
const LABEL_TERMS: usize = 5;

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    pub k: usize,
    /// Independent restarts; the lowest-inertia run wins
    pub n_init: usize,
    pub max_iter: usize,
    /// Convergence tolerance, relative to the mean per-feature variance
    pub tol: f64,
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed,
        }
    }
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster index per input point
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from points to their centroid
    pub inertia: f64,
}

/// A group of blogs with similar vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: usize,
    /// Top centroid terms joined with ", "
    pub label: String,
    pub keywords: Vec<String>,
    pub blogs: Vec<String>,
}

/// Partition blogs into `min(requested_k, blog count)` clusters.
pub fn cluster_blogs(vectors: &BlogVectors, requested_k: usize, seed: u64) -> Vec<Cluster> {
    let k = requested_k.min(vectors.len());
    if k == 0 {
        return Vec::new();
    }

    let matrix = vectors.matrix();
    let points: Vec<Vec<f64>> = (0..matrix.len()).map(|i| matrix.dense_row(i)).collect();
    let fit = kmeans(&points, &KMeansConfig::new(k, seed));
    let vocabulary = matrix.vocabulary();

    let clusters: Vec<Cluster> = (0..k)
        .map(|cluster_id| {
            let keywords: Vec<String> = top_terms(&fit.centroids[cluster_id], LABEL_TERMS)
                .into_iter()
                .map(|term| vocabulary[term].clone())
                .collect();
            let blogs: Vec<String> = fit
                .labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == cluster_id)
                .map(|(i, _)| vectors.names()[i].clone())
                .collect();
            Cluster {
                cluster_id,
                label: keywords.join(", "),
                keywords,
                blogs,
            }
        })
        .collect();

    info!(
        blogs = vectors.len(),
        requested = requested_k,
        clusters = k,
        inertia = fit.inertia,
        "Clustered blogs"
    );

    clusters
}

/// Indices of the `n` largest positive weights, largest first.
fn top_terms(centroid: &[f64], n: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..centroid.len()).filter(|&i| centroid[i] > 0.0).collect();
    ranked.sort_by(|&a, &b| {
        centroid[b]
            .partial_cmp(&centroid[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    ranked.truncate(n);
    ranked
}

/// Run k-means on dense points. `config.k` must not exceed `points.len()`.
pub fn kmeans(points: &[Vec<f64>], config: &KMeansConfig) -> KMeansFit {
    let n = points.len();
    let k = config.k.min(n);
    if k == 0 {
        return KMeansFit {
            labels: vec![0; n],
            centroids: Vec::new(),
            inertia: 0.0,
        };
    }

    let tol = config.tol * mean_variance(points);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;

    for run in 0..config.n_init.max(1) {
        let fit = lloyd(points, k, config.max_iter, tol, &mut rng);
        debug!(run, inertia = fit.inertia, "k-means restart");
        if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }

    best.unwrap_or_else(|| KMeansFit {
        labels: vec![0; n],
        centroids: Vec::new(),
        inertia: 0.0,
    })
}

fn lloyd(points: &[Vec<f64>], k: usize, max_iter: usize, tol: f64, rng: &mut StdRng) -> KMeansFit {
    let mut centroids = init_plus_plus(points, k, rng);
    let mut labels: Vec<usize> = Vec::new();

    for _ in 0..max_iter {
        let mut new_labels = assign(points, &centroids);
        fill_empty_clusters(points, &mut new_labels, &centroids, k);
        let new_centroids = means(points, &new_labels, k);

        let shift: f64 = centroids
            .iter()
            .zip(&new_centroids)
            .map(|(a, b)| squared_distance(a, b))
            .sum();
        let converged = new_labels == labels || shift <= tol;

        labels = new_labels;
        centroids = new_centroids;
        if converged {
            break;
        }
    }

    // Final assignment against the settled centroids, then make the
    // centroids describe exactly the members they ended up with.
    let mut labels_final = assign(points, &centroids);
    fill_empty_clusters(points, &mut labels_final, &centroids, k);
    let centroids = means(points, &labels_final, k);
    let inertia = points
        .iter()
        .zip(&labels_final)
        .map(|(p, &c)| squared_distance(p, &centroids[c]))
        .sum();

    KMeansFit {
        labels: labels_final,
        centroids,
        inertia,
    }
}

/// k-means++: first centre uniform, each next one drawn with probability
/// proportional to squared distance from the nearest centre so far.
fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..n)].clone());

    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();
        let chosen = if total <= 0.0 {
            rng.random_range(0..n)
        } else {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut pick = n - 1;
            for (i, &d) in nearest.iter().enumerate() {
                cumulative += d;
                if d > 0.0 && cumulative > target {
                    pick = i;
                    break;
                }
            }
            pick
        };

        let centre = points[chosen].clone();
        for (i, p) in points.iter().enumerate() {
            nearest[i] = nearest[i].min(squared_distance(p, &centre));
        }
        centroids.push(centre);
    }

    centroids
}

/// Nearest centroid per point; ties go to the lower cluster index.
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(p, centroid);
                if d < best_dist {
                    best = c;
                    best_dist = d;
                }
            }
            best
        })
        .collect()
}

/// Give each empty cluster the point farthest from its own centroid, taken
/// only from clusters with more than one member.
fn fill_empty_clusters(points: &[Vec<f64>], labels: &mut [usize], centroids: &[Vec<f64>], k: usize) {
    let mut sizes = vec![0usize; k];
    for &label in labels.iter() {
        sizes[label] += 1;
    }

    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }
        let donor = (0..points.len())
            .filter(|&i| sizes[labels[i]] > 1)
            .map(|i| (i, squared_distance(&points[i], &centroids[labels[i]])))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, best_d)) if best_d >= d => best,
                _ => Some((i, d)),
            });

        if let Some((i, _)) = donor {
            sizes[labels[i]] -= 1;
            labels[i] = empty;
            sizes[empty] += 1;
        }
    }
}

fn means(points: &[Vec<f64>], labels: &[usize], k: usize) -> Vec<Vec<f64>> {
    let dim = points.first().map(|p| p.len()).unwrap_or(0);
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];

    for (p, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (s, v) in sums[label].iter_mut().zip(p) {
            *s += v;
        }
    }

    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            for s in sum.iter_mut() {
                *s /= count as f64;
            }
        }
    }
    sums
}

fn mean_variance(points: &[Vec<f64>]) -> f64 {
    let n = points.len() as f64;
    let dim = points.first().map(|p| p.len()).unwrap_or(0);
    if dim == 0 || n == 0.0 {
        return 0.0;
    }

    let mut total = 0.0;
    for d in 0..dim {
        let mean = points.iter().map(|p| p[d]).sum::<f64>() / n;
        total += points.iter().map(|p| (p[d] - mean).powi(2)).sum::<f64>() / n;
    }
    total / dim as f64
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
