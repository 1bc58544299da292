//! Pairwise similarity over normalised numeric rows.
//!
//! - Cosine: `a·b / (|a||b|)`, 0.0 when either vector has zero norm.
//! - Euclidean-derived: `1 / (1 + |a - b|)`, bounded in (0, 1].
//!
//! [`similarity_matrix`] builds the full N×N matrix. Each unordered pair is
//! evaluated once and mirrored, so the result is exactly symmetric; rows of the
//! upper triangle are computed in parallel.

use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RecommendError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    #[default]
    Cosine,
    Euclidean,
}

impl SimilarityMethod {
    pub const EXPECTED: &'static str = "'cosine' or 'euclidean'";

    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityMethod::Cosine => "cosine",
            SimilarityMethod::Euclidean => "euclidean",
        }
    }

    /// Similarity of a single pair of rows under this metric.
    #[inline]
    pub fn pair(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            SimilarityMethod::Cosine => cosine_similarity(a, b),
            SimilarityMethod::Euclidean => euclidean_similarity(a, b),
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMethod {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cosine" => Ok(SimilarityMethod::Cosine),
            "euclidean" => Ok(SimilarityMethod::Euclidean),
            other => Err(RecommendError::InvalidMethod {
                method: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Euclidean norm (L2).
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// # Panics
///
/// Panics if the lengths differ.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity, guarding against zero vectors.
///
/// ```
/// use tunespace::similarity::cosine_similarity;
/// assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-12);
/// assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-12);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let denom = norm(a) * norm(b);
    if denom > 0.0 {
        dot(a, b) / denom
    } else {
        0.0
    }
}

/// # Panics
///
/// Panics if the lengths differ.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// `1 / (1 + euclidean_distance)`.
///
/// ```
/// use tunespace::similarity::euclidean_similarity;
/// assert_eq!(euclidean_similarity(&[1.0, 1.0], &[1.0, 1.0]), 1.0);
/// assert!((euclidean_similarity(&[1.0, 1.0], &[4.0, 5.0]) - 1.0 / 6.0).abs() < 1e-12);
/// ```
#[inline]
pub fn euclidean_similarity(a: &[f64], b: &[f64]) -> f64 {
    1.0 / (1.0 + euclidean_distance(a, b))
}

/// Full symmetric similarity matrix of `rows` under `method`.
///
/// Fewer than two rows yields an empty matrix.
pub fn similarity_matrix<R>(rows: &[R], method: SimilarityMethod) -> Vec<Vec<f64>>
where
    R: AsRef<[f64]> + Sync,
{
    let n = rows.len();
    if n < 2 {
        debug!("Similarity matrix needs at least 2 rows, got {}", n);
        return Vec::new();
    }
    debug!("Computing {}x{} {} similarity matrix", n, n, method);

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let a = rows[i].as_ref();
            (i..n).map(|j| method.pair(a, rows[j].as_ref())).collect()
        })
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for (i, tail) in upper.into_iter().enumerate() {
        for (offset, s) in tail.into_iter().enumerate() {
            let j = i + offset;
            matrix[i][j] = s;
            matrix[j][i] = s;
        }
    }
    trace!("Similarity matrix row 0: {:?}", matrix[0]);
    matrix
}
