use thiserror::Error;

/// Errors returned by the clustering and scoring pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// An entity is missing a required field (name or closing price).
    #[error("malformed entity: {name}")]
    MalformedEntity {
        /// Display name of the offending entity (`"<unnamed>"` when the name is missing).
        name: String,
    },

    /// Unknown cluster-quality metric name in configuration.
    #[error("unsupported quality metric: {name}")]
    UnsupportedMetric {
        /// The metric name as given.
        name: String,
    },

    /// A strategy that needs a fixed cluster count was called without one.
    #[error("strategy {strategy} requires a target cluster count")]
    MissingTarget {
        /// Strategy name.
        strategy: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Configuration could not be loaded or compiled.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
