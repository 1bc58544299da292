//! Error taxonomy for the ranking engine.
//!
//! Only [`RecommendError::InvalidMethod`] ever escapes a ranking call. Empty
//! inputs, single-row batches and clustering failures are absorbed into empty
//! or neutral results by the operations themselves; the remaining variants are
//! raised while building a [`crate::core::Recommender`] or a
//! [`crate::weights::WeightTable`].

use thiserror::Error;

/// Result type for tunespace operations
pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Unrecognized similarity or ranking method name
    #[error("invalid method '{method}': expected {expected}")]
    InvalidMethod {
        method: String,
        expected: &'static str,
    },

    /// Weight table violates the one-positive-weight-per-dimension invariant
    #[error("invalid weight table: {0}")]
    InvalidWeight(String),

    /// Tolerance outside [0, 1]
    #[error("invalid tolerance {0}: must be within [0, 1]")]
    InvalidTolerance(f64),

    /// Any other rejected engine setting
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Standard scaling of a batch failed
    #[error("normalisation failed: {0}")]
    Normalisation(String),

    /// k-means fit or predict failed
    #[error("clustering failed: {0}")]
    Clustering(String),
}
