//! Density clustering over a precomputed distance matrix.
//!
//! Points with enough neighbors inside `eps` form clusters; everything else
//! is labeled noise. The cluster count is derived from the data, which is
//! why the fraud scorer uses this family: the requested count is an upper
//! bound it is free to ignore.
//!
//! When no `eps` is configured it is derived from the matrix as the median
//! nearest-neighbor distance, so dense sub-populations connect while
//! isolated prices stay noise.

use super::traits::{ClusterAlgorithm, NOISE};
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;

// Internal label encoding.
// - UNCLASSIFIED: never assigned yet
// - NOISE_LABEL: visited, but not density-reachable from any core point (may be promoted later)
const UNCLASSIFIED: i64 = -2;
const NOISE_LABEL: i64 = -1;

/// Density clustering strategy (DBSCAN-style, precomputed distances).
#[derive(Debug, Clone)]
pub struct Density {
    eps: Option<f64>,
    min_neighbors: usize,
}

impl Density {
    /// Create a density clusterer with auto-derived `eps` and the small-input
    /// default of 2 minimum neighbors (the point itself counts).
    pub fn new() -> Self {
        Self {
            eps: None,
            min_neighbors: 2,
        }
    }

    /// Fix the neighborhood radius instead of deriving it from the data.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = Some(eps);
        self
    }

    /// Set the minimum neighborhood size for core classification
    /// (the point itself included).
    pub fn with_min_neighbors(mut self, min_neighbors: usize) -> Self {
        self.min_neighbors = min_neighbors;
        self
    }

    /// Indices within `eps` of `point`, excluding the point itself.
    fn region_query(&self, matrix: &DistanceMatrix, point: usize, eps: f64) -> Vec<usize> {
        matrix
            .row(point)
            .iter()
            .enumerate()
            .filter(|&(idx, &d)| idx != point && d <= eps)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn expand_cluster(
        &self,
        matrix: &DistanceMatrix,
        eps: f64,
        point: usize,
        neighbors: &[usize],
        labels: &mut [i64],
        cluster_id: i64,
        visited: &mut [bool],
    ) {
        labels[point] = cluster_id;

        // Queue-based expansion, no recursion.
        let mut to_process: Vec<usize> = neighbors.to_vec();

        while let Some(neighbor) = to_process.pop() {
            // A point previously labeled noise can later become a border
            // point, so assign labels before the `visited` check.
            if labels[neighbor] == UNCLASSIFIED || labels[neighbor] == NOISE_LABEL {
                labels[neighbor] = cluster_id;
            }

            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;

            let neighbor_neighbors = self.region_query(matrix, neighbor, eps);
            // min_neighbors includes the point itself.
            if neighbor_neighbors.len() + 1 >= self.min_neighbors {
                for nn in neighbor_neighbors {
                    if !visited[nn] {
                        to_process.push(nn);
                    }
                }
            }
        }
    }
}

impl Default for Density {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterAlgorithm for Density {
    fn cluster(&self, matrix: &DistanceMatrix, _target: Option<usize>) -> Result<Vec<i64>> {
        let n = matrix.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.min_neighbors == 0 {
            return Err(Error::InvalidParameter {
                name: "min_neighbors",
                message: "must be at least 1",
            });
        }
        let eps = match self.eps {
            Some(eps) if eps.is_finite() && eps >= 0.0 => eps,
            Some(_) => {
                return Err(Error::InvalidParameter {
                    name: "eps",
                    message: "must be finite and non-negative",
                })
            }
            None => derive_eps(matrix),
        };

        let mut labels = vec![UNCLASSIFIED; n];
        let mut visited = vec![false; n];
        let mut cluster_id: i64 = 0;

        for point in 0..n {
            if visited[point] {
                continue;
            }
            visited[point] = true;

            let neighbors = self.region_query(matrix, point, eps);
            if neighbors.len() + 1 < self.min_neighbors {
                // Not enough neighbors: noise for now (might become border).
                labels[point] = NOISE_LABEL;
                continue;
            }

            self.expand_cluster(
                matrix,
                eps,
                point,
                &neighbors,
                &mut labels,
                cluster_id,
                &mut visited,
            );
            cluster_id += 1;
        }

        Ok(labels
            .into_iter()
            .map(|l| if l >= 0 { l } else { NOISE })
            .collect())
    }

    fn requires_target(&self) -> bool {
        false
    }
}

/// Median of each point's nearest-neighbor distance.
fn derive_eps(matrix: &DistanceMatrix) -> f64 {
    let n = matrix.len();
    if n < 2 {
        return 0.0;
    }
    let mut nearest: Vec<f64> = (0..n)
        .map(|i| {
            matrix
                .row(i)
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &d)| d)
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    nearest.sort_by(f64::total_cmp);
    if n % 2 == 1 {
        nearest[n / 2]
    } else {
        (nearest[n / 2 - 1] + nearest[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_matrix(coords: &[f64]) -> DistanceMatrix {
        DistanceMatrix::from_pairs(coords.len(), |i, j| (coords[i] - coords[j]).abs())
    }

    #[test]
    fn two_clusters_and_noise() {
        let m = line_matrix(&[0.0, 1.0, 2.0, 100.0, 101.0, 102.0, 500.0]);
        let labels = Density::new().with_eps(2.0).cluster(&m, None).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[6], NOISE);
    }

    #[test]
    fn auto_eps_isolates_price_outlier() {
        let m = line_matrix(&[99.0, 100.0, 101.0, 102.0, 500.0]);
        let labels = Density::new().cluster(&m, Some(5)).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[2], labels[3]);
        assert_eq!(labels[4], NOISE);
    }

    #[test]
    fn chain_connects() {
        let m = line_matrix(&[0.0, 0.3, 0.6, 0.9, 1.2]);
        let labels = Density::new().with_eps(0.5).cluster(&m, None).unwrap();
        assert!(labels.iter().all(|&l| l == labels[0]));
        assert_ne!(labels[0], NOISE);
    }

    #[test]
    fn all_noise_when_sparse() {
        let m = line_matrix(&[0.0, 10.0, 20.0, 30.0]);
        let labels = Density::new().with_eps(0.5).cluster(&m, None).unwrap();
        assert!(labels.iter().all(|&l| l == NOISE));
    }

    #[test]
    fn duplicates_cluster_at_zero_eps() {
        let m = line_matrix(&[5.0, 5.0, 5.0]);
        let labels = Density::new().with_eps(0.0).cluster(&m, None).unwrap();
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn rejects_bad_params() {
        let m = line_matrix(&[0.0, 1.0]);
        assert!(Density::new()
            .with_min_neighbors(0)
            .cluster(&m, None)
            .is_err());
        assert!(Density::new().with_eps(f64::NAN).cluster(&m, None).is_err());
        assert!(Density::new().with_eps(-1.0).cluster(&m, None).is_err());
    }

    #[test]
    fn derives_its_own_count() {
        assert!(!Density::new().requires_target());
    }

    #[test]
    fn empty_matrix_is_an_error() {
        let m = line_matrix(&[]);
        assert!(matches!(
            Density::new().cluster(&m, None),
            Err(Error::EmptyInput)
        ));
    }
}
