//! Clustering strategies over precomputed distance matrices.
//!
//! Every strategy consumes a [`DistanceMatrix`](crate::matrix::DistanceMatrix)
//! and produces one label per entity, so the same machinery serves
//! edit-distance matrices over names and absolute-difference matrices over
//! prices.
//!
//! ## Strategy families
//!
//! - [`Agglomerative`]: bottom-up merging with average or complete linkage;
//!   needs a target count.
//! - [`Kmeans`]: centroid clustering on a 2-D principal-component embedding
//!   of the similarity-transformed matrix; needs a target count. The
//!   [`Kmeans::plus_plus`] variant improves seeding and clamps the count to
//!   the number of distinct embedded points.
//! - [`Density`]: neighborhood-density clustering with noise labeling;
//!   derives its own cluster count.
//!
//! [`CountSelector`] sweeps candidate counts for the strategies that need
//! one, scoring each labeling with a [`QualityMetric`].

mod density;
mod hierarchical;
mod kmeans;
mod quality;
mod traits;

pub use density::Density;
pub use hierarchical::{Agglomerative, Linkage};
pub use kmeans::Kmeans;
pub use quality::{CountSelector, QualityMetric};
pub use traits::{ClusterAlgorithm, NOISE};
