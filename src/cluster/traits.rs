use crate::error::Result;
use crate::matrix::DistanceMatrix;

/// Label given to points no density cluster claims.
pub const NOISE: i64 = -1;

/// Common interface for clustering strategies over a precomputed distance
/// matrix (one label per entity).
pub trait ClusterAlgorithm {
    /// Cluster the entities behind `matrix` and return one label per index.
    ///
    /// `target` is the requested cluster count. Strategies that derive the
    /// count from the data (density family) ignore it; strategies that need
    /// it fail with [`crate::Error::MissingTarget`] when it is absent.
    /// Labels are non-negative except [`NOISE`].
    fn cluster(&self, matrix: &DistanceMatrix, target: Option<usize>) -> Result<Vec<i64>>;

    /// Whether this strategy needs a fixed `target` cluster count.
    fn requires_target(&self) -> bool;
}
