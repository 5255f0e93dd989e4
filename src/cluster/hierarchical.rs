//! Agglomerative clustering over a precomputed distance matrix.
//!
//! Bottom-up merging: every entity starts as its own cluster and the two
//! closest clusters (under the configured linkage) merge until exactly the
//! target count remains. Works directly on pairwise distances, so it is the
//! natural fit for edit-distance inputs where no coordinates exist.

use super::traits::ClusterAlgorithm;
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;

/// Cluster-to-cluster distance used when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Linkage {
    /// Mean pairwise distance between members of the two clusters.
    #[default]
    Average,
    /// Maximum pairwise distance between members of the two clusters.
    Complete,
}

/// Agglomerative (hierarchical) clustering strategy.
#[derive(Debug, Clone, Default)]
pub struct Agglomerative {
    linkage: Linkage,
}

impl Agglomerative {
    /// Create an agglomerative clusterer with average linkage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the linkage criterion.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    fn cluster_distance(&self, matrix: &DistanceMatrix, a: &[usize], b: &[usize]) -> f64 {
        match self.linkage {
            Linkage::Average => {
                let mut sum = 0.0;
                for &i in a {
                    for &j in b {
                        sum += matrix.get(i, j);
                    }
                }
                sum / (a.len() * b.len()) as f64
            }
            Linkage::Complete => {
                let mut max = 0.0f64;
                for &i in a {
                    for &j in b {
                        max = max.max(matrix.get(i, j));
                    }
                }
                max
            }
        }
    }
}

impl ClusterAlgorithm for Agglomerative {
    fn cluster(&self, matrix: &DistanceMatrix, target: Option<usize>) -> Result<Vec<i64>> {
        let n = matrix.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        let target = target.ok_or(Error::MissingTarget {
            strategy: "agglomerative",
        })?;
        if target == 0 || target > n {
            return Err(Error::InvalidClusterCount {
                requested: target,
                n_items: n,
            });
        }

        let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

        while clusters.len() > target {
            let mut best = (0usize, 1usize);
            let mut best_dist = f64::INFINITY;
            for a in 0..clusters.len() {
                for b in (a + 1)..clusters.len() {
                    let d = self.cluster_distance(matrix, &clusters[a], &clusters[b]);
                    if d < best_dist {
                        best_dist = d;
                        best = (a, b);
                    }
                }
            }
            // b > a, so removing b leaves a's index valid.
            let merged = clusters.remove(best.1);
            clusters[best.0].extend(merged);
        }

        // Stable label order: clusters numbered by their earliest member.
        clusters.sort_by_key(|members| members.iter().copied().min().unwrap_or(usize::MAX));
        let mut labels = vec![0i64; n];
        for (id, members) in clusters.iter().enumerate() {
            for &m in members {
                labels[m] = id as i64;
            }
        }
        Ok(labels)
    }

    fn requires_target(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_of(rows: &[&[f64]]) -> DistanceMatrix {
        DistanceMatrix::from_pairs(rows.len(), |i, j| rows[i][j])
    }

    #[test]
    fn merges_closest_pair_first() {
        // 0 and 1 are near, 2 is far from both.
        let m = matrix_of(&[&[0.0, 1.0, 10.0], &[1.0, 0.0, 9.0], &[10.0, 9.0, 0.0]]);
        let labels = Agglomerative::new().cluster(&m, Some(2)).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn target_one_is_a_single_cluster() {
        let m = matrix_of(&[&[0.0, 5.0], &[5.0, 0.0]]);
        let labels = Agglomerative::new().cluster(&m, Some(1)).unwrap();
        assert_eq!(labels, vec![0, 0]);
    }

    #[test]
    fn target_n_keeps_singletons() {
        let m = matrix_of(&[&[0.0, 5.0, 6.0], &[5.0, 0.0, 7.0], &[6.0, 7.0, 0.0]]);
        let labels = Agglomerative::new().cluster(&m, Some(3)).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn complete_linkage_separates_chains() {
        // A chain 0-1-2 with a tight pair 3-4 far away. Complete linkage
        // resists absorbing the chain end.
        let m = DistanceMatrix::from_pairs(5, |i, j| {
            let coords = [0.0f64, 2.0, 4.0, 50.0, 51.0];
            (coords[i] - coords[j]).abs()
        });
        let labels = Agglomerative::new()
            .with_linkage(Linkage::Complete)
            .cluster(&m, Some(2))
            .unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn needs_a_target() {
        assert!(Agglomerative::new().requires_target());
    }

    #[test]
    fn rejects_missing_or_invalid_target() {
        let m = matrix_of(&[&[0.0, 1.0], &[1.0, 0.0]]);
        assert!(matches!(
            Agglomerative::new().cluster(&m, None),
            Err(Error::MissingTarget { .. })
        ));
        assert!(matches!(
            Agglomerative::new().cluster(&m, Some(3)),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            Agglomerative::new().cluster(&m, Some(0)),
            Err(Error::InvalidClusterCount { .. })
        ));
    }
}
