//! Centroid clustering over a precomputed distance matrix.
//!
//! Centroid methods need coordinates, not distances, so the matrix is first
//! turned into similarities (`1 / (1 + d)`, zero diagonal) and the similarity
//! rows are projected onto their two principal components. Lloyd iterations
//! then run on the 2-D embedding with multiple restarts, keeping the
//! lowest-inertia labeling.

use rand::prelude::*;

use super::traits::ClusterAlgorithm;
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;

const POWER_ITERATIONS: usize = 100;

/// K-means over the principal-component embedding of the similarity matrix.
#[derive(Debug, Clone)]
pub struct Kmeans {
    restarts: usize,
    max_iter: usize,
    plus_plus: bool,
    seed: Option<u64>,
}

impl Kmeans {
    /// K-means with uniform random seeding.
    pub fn new() -> Self {
        Self {
            restarts: 20,
            max_iter: 100,
            plus_plus: false,
            seed: None,
        }
    }

    /// K-means with "++" (D^2-weighted) seeding.
    ///
    /// The `++` variant also clamps the requested cluster count down to the
    /// number of distinct embedded points, since more centroids than distinct
    /// points cannot be seeded apart.
    pub fn plus_plus() -> Self {
        Self {
            plus_plus: true,
            ..Self::new()
        }
    }

    /// Number of restarts; the lowest-inertia run wins. Minimum 1.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Maximum Lloyd iterations per restart.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fix the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for Kmeans {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterAlgorithm for Kmeans {
    fn cluster(&self, matrix: &DistanceMatrix, target: Option<usize>) -> Result<Vec<i64>> {
        let n = matrix.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        let requested = target.ok_or(Error::MissingTarget { strategy: "k-means" })?;
        if requested == 0 || requested > n {
            return Err(Error::InvalidClusterCount {
                requested,
                n_items: n,
            });
        }

        let points = embed(matrix);
        let k = if self.plus_plus {
            requested.min(distinct_points(&points)).max(1)
        } else {
            requested
        };
        if k == 1 {
            return Ok(vec![0; n]);
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut best_labels: Vec<usize> = vec![0; n];
        let mut best_inertia = f64::INFINITY;
        for _ in 0..self.restarts {
            let centroids = if self.plus_plus {
                seed_weighted(&points, k, &mut rng)
            } else {
                seed_uniform(&points, k, &mut rng)
            };
            let (labels, inertia) = lloyd(&points, centroids, self.max_iter);
            if inertia < best_inertia {
                best_inertia = inertia;
                best_labels = labels;
            }
        }

        Ok(best_labels.into_iter().map(|l| l as i64).collect())
    }

    fn requires_target(&self) -> bool {
        true
    }
}

/// Project similarity rows onto their two principal components.
fn embed(matrix: &DistanceMatrix) -> Vec<[f64; 2]> {
    let n = matrix.len();

    let mut rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        1.0 / (1.0 + matrix.get(i, j))
                    }
                })
                .collect()
        })
        .collect();

    // Center each column.
    for c in 0..n {
        let mean = rows.iter().map(|r| r[c]).sum::<f64>() / n as f64;
        for row in rows.iter_mut() {
            row[c] -= mean;
        }
    }

    // Covariance of the centered rows (scale factors cancel in the
    // eigenvector computation).
    let mut cov = vec![vec![0.0f64; n]; n];
    for row in &rows {
        for a in 0..n {
            if row[a] == 0.0 {
                continue;
            }
            for b in 0..n {
                cov[a][b] += row[a] * row[b];
            }
        }
    }

    let first = principal_axis(&cov);
    deflate(&mut cov, &first);
    let second = principal_axis(&cov);

    rows.iter()
        .map(|r| [dot(r, &first), dot(r, &second)])
        .collect()
}

/// Dominant eigenvector via power iteration; the zero vector when the
/// matrix has no signal left.
fn principal_axis(cov: &[Vec<f64>]) -> Vec<f64> {
    let n = cov.len();
    // Deterministic, asymmetric start.
    let mut v: Vec<f64> = (0..n).map(|i| 1.0 / (i + 1) as f64).collect();
    normalize_in_place(&mut v);

    for _ in 0..POWER_ITERATIONS {
        let mut w = vec![0.0f64; n];
        for (a, row) in cov.iter().enumerate() {
            w[a] = dot(row, &v);
        }
        let norm = w.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm <= f64::EPSILON {
            return vec![0.0; n];
        }
        for x in w.iter_mut() {
            *x /= norm;
        }
        v = w;
    }
    v
}

fn deflate(cov: &mut [Vec<f64>], axis: &[f64]) {
    let n = cov.len();
    let mut cv = vec![0.0f64; n];
    for (a, row) in cov.iter().enumerate() {
        cv[a] = dot(row, axis);
    }
    let lambda = dot(&cv, axis);
    for a in 0..n {
        for b in 0..n {
            cov[a][b] -= lambda * axis[a] * axis[b];
        }
    }
}

fn normalize_in_place(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for x in v {
            *x /= norm;
        }
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
fn sq_dist(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn distinct_points(points: &[[f64; 2]]) -> usize {
    points
        .iter()
        .map(|p| (p[0].to_bits(), p[1].to_bits()))
        .collect::<std::collections::HashSet<_>>()
        .len()
}

fn seed_uniform<R: Rng>(points: &[[f64; 2]], k: usize, rng: &mut R) -> Vec<[f64; 2]> {
    let mut indices: Vec<usize> = (0..points.len()).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.into_iter().map(|i| points[i]).collect()
}

/// D^2-weighted ("++") seeding: each next centroid is sampled with
/// probability proportional to its squared distance from the nearest
/// already-chosen centroid.
fn seed_weighted<R: Rng>(points: &[[f64; 2]], k: usize, rng: &mut R) -> Vec<[f64; 2]> {
    let n = points.len();
    let first = rng.random_range(0..n);
    let mut centroids = vec![points[first]];
    let mut d2: Vec<f64> = points.iter().map(|p| sq_dist(p, &points[first])).collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let next = if total <= 0.0 {
            rng.random_range(0..n)
        } else {
            let mut r = rng.random::<f64>() * total;
            let mut chosen = n - 1;
            for (i, &w) in d2.iter().enumerate() {
                if r < w {
                    chosen = i;
                    break;
                }
                r -= w;
            }
            chosen
        };
        centroids.push(points[next]);
        for (i, p) in points.iter().enumerate() {
            d2[i] = d2[i].min(sq_dist(p, &points[next]));
        }
    }
    centroids
}

fn lloyd(points: &[[f64; 2]], mut centroids: Vec<[f64; 2]>, max_iter: usize) -> (Vec<usize>, f64) {
    let n = points.len();
    let k = centroids.len();
    let mut labels = vec![0usize; n];

    for _ in 0..max_iter.max(1) {
        let mut changed = false;

        for (i, p) in points.iter().enumerate() {
            let mut best = 0usize;
            let mut best_d = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = sq_dist(p, centroid);
                if d < best_d {
                    best_d = d;
                    best = c;
                }
            }
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }

        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (i, p) in points.iter().enumerate() {
            sums[labels[i]][0] += p[0];
            sums[labels[i]][1] += p[1];
            counts[labels[i]] += 1;
        }
        for c in 0..k {
            if counts[c] == 0 {
                // Re-seed an empty cluster at the point worst served by its
                // current assignment.
                let far = (0..n)
                    .max_by(|&a, &b| {
                        sq_dist(&points[a], &centroids[labels[a]])
                            .total_cmp(&sq_dist(&points[b], &centroids[labels[b]]))
                    })
                    .unwrap_or(0);
                centroids[c] = points[far];
                changed = true;
            } else {
                centroids[c] = [
                    sums[c][0] / counts[c] as f64,
                    sums[c][1] / counts[c] as f64,
                ];
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .enumerate()
        .map(|(i, p)| sq_dist(p, &centroids[labels[i]]))
        .sum();
    (labels, inertia)
}
