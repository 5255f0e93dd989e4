//! Internal clustering-quality indices and optimal-count selection.
//!
//! Both indices score a labeling from the distance matrix and the labels
//! alone, with no ground truth. The dispersion ratio treats the matrix rows
//! as coordinates, matching how the original pipeline fed its precomputed
//! matrix to the Calinski-Harabasz index.

use std::collections::HashMap;

use tracing::debug;

use super::traits::ClusterAlgorithm;
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;

/// Which internal index scores a candidate labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityMetric {
    /// Between/within dispersion ratio (Calinski-Harabasz).
    #[default]
    DispersionRatio,
    /// Mean silhouette coefficient over precomputed distances.
    Silhouette,
}

impl QualityMetric {
    /// Resolve a configured metric name.
    ///
    /// Unknown names are a caller configuration error, surfaced before any
    /// clustering work happens.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "dispersion_ratio" | "calinski_harabasz" => Ok(Self::DispersionRatio),
            "silhouette" => Ok(Self::Silhouette),
            other => Err(Error::UnsupportedMetric {
                name: other.to_string(),
            }),
        }
    }

    /// Score a labeling; `None` when the labeling is degenerate for this
    /// index (fewer than 2 clusters, or no items left outside a cluster).
    pub fn score(&self, matrix: &DistanceMatrix, labels: &[i64]) -> Option<f64> {
        match self {
            Self::DispersionRatio => dispersion_ratio(matrix, labels),
            Self::Silhouette => silhouette(matrix, labels),
        }
    }
}

fn groups_of(labels: &[i64]) -> Vec<Vec<usize>> {
    let mut order: Vec<i64> = Vec::new();
    let mut by_label: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        let members = by_label.entry(label).or_insert_with(|| {
            order.push(label);
            Vec::new()
        });
        members.push(idx);
    }
    order.into_iter().map(|l| by_label.remove(&l).unwrap_or_default()).collect()
}

/// Calinski-Harabasz with matrix rows as coordinates.
fn dispersion_ratio(matrix: &DistanceMatrix, labels: &[i64]) -> Option<f64> {
    let n = matrix.len();
    let groups = groups_of(labels);
    let k = groups.len();
    if k < 2 || k >= n {
        return None;
    }

    let overall = centroid(matrix, &(0..n).collect::<Vec<_>>());

    let mut between = 0.0;
    let mut within = 0.0;
    for members in &groups {
        let center = centroid(matrix, members);
        between += members.len() as f64 * sq_euclidean(&center, &overall);
        for &i in members {
            within += sq_euclidean(matrix.row(i), &center);
        }
    }

    if within == 0.0 {
        return Some(1.0);
    }
    Some(between * (n - k) as f64 / (within * (k - 1) as f64))
}

fn centroid(matrix: &DistanceMatrix, members: &[usize]) -> Vec<f64> {
    let n = matrix.len();
    let mut center = vec![0.0f64; n];
    for &i in members {
        for (c, &v) in matrix.row(i).iter().enumerate() {
            center[c] += v;
        }
    }
    for v in center.iter_mut() {
        *v /= members.len() as f64;
    }
    center
}

fn sq_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Mean silhouette coefficient over precomputed distances. Singleton
/// clusters contribute 0.
fn silhouette(matrix: &DistanceMatrix, labels: &[i64]) -> Option<f64> {
    let n = matrix.len();
    let groups = groups_of(labels);
    if groups.len() < 2 {
        return None;
    }

    let mut total = 0.0;
    for (g, members) in groups.iter().enumerate() {
        for &i in members {
            if members.len() == 1 {
                continue; // silhouette 0
            }
            let own: f64 = members
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| matrix.get(i, j))
                .sum::<f64>()
                / (members.len() - 1) as f64;

            let nearest_other = groups
                .iter()
                .enumerate()
                .filter(|&(h, other)| h != g && !other.is_empty())
                .map(|(_, other)| {
                    other.iter().map(|&j| matrix.get(i, j)).sum::<f64>() / other.len() as f64
                })
                .fold(f64::INFINITY, f64::min);

            let denom = own.max(nearest_other);
            if denom > 0.0 {
                total += (nearest_other - own) / denom;
            }
        }
    }
    Some(total / n as f64)
}

/// Sweeps candidate cluster counts and keeps the best-scoring one.
#[derive(Debug, Clone, Default)]
pub struct CountSelector {
    metric: QualityMetric,
}

impl CountSelector {
    /// Selector using the given quality metric.
    pub fn new(metric: QualityMetric) -> Self {
        Self { metric }
    }

    /// Pick the best cluster count in `[2, min(distinct_names, n) - 1]`.
    ///
    /// Returns `Ok(None)` when the candidate range is empty (fewer than 2
    /// usable entities); the caller handles the degenerate single-cluster
    /// case. Candidate labelings that collapse below 2 clusters are skipped.
    pub fn select(
        &self,
        matrix: &DistanceMatrix,
        distinct_names: usize,
        strategy: &dyn ClusterAlgorithm,
    ) -> Result<Option<usize>> {
        let n = matrix.len();
        let max = distinct_names.min(n).saturating_sub(1);

        let mut best: Option<(usize, f64)> = None;
        for count in 2..=max {
            let labels = strategy.cluster(matrix, Some(count))?;
            let Some(score) = self.metric.score(matrix, &labels) else {
                continue;
            };
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((count, score));
            }
        }

        if let Some((count, score)) = best {
            debug!(count, score, "selected cluster count");
        }
        Ok(best.map(|(count, _)| count))
    }
}
