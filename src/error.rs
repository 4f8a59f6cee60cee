use thiserror::Error;

/// Errors returned by clustering algorithms in this crate.
///
/// Every variant is a configuration or input-shape problem detected before the
/// iterative phase of an algorithm starts. Degenerate data (no points, empty
/// clusters, no convergence) is handled by policy and never reported here.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// A named option (distance, linkage, preference) was not recognized.
    #[error("unknown {option} {value:?}")]
    UnknownOption {
        /// Option being parsed.
        option: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Number of clusters requested.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points (or fixed representatives) have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A point index (edge endpoint, fixed medoid) is outside the dataset.
    #[error("point index {index} out of range for {len} points")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of points.
        len: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
