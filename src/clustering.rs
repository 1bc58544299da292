//! k-means partition of a track batch.
//!
//! Tracks are normalised as one batch (no target involved) and clustered with
//! smartcore's `KMeans` under a fixed seed, so repeated calls on the same batch
//! return the same labels.
//!
//! Clustering is best-effort analytics. Whenever it cannot produce a labelling
//! (fewer tracks than clusters, fewer than two clusters, a backend error, even a
//! backend panic) the result is one `0` label per track.
//!
//! **DETERMINISTIC**: every run uses [`CLUSTERING_SEED`] unless overridden.

use std::panic::{self, AssertUnwindSafe};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::arrays::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{RecommendError, Result};
use crate::features::Track;
use crate::normalise::normalise_tracks;

/// Fixed seed for deterministic clustering
pub const CLUSTERING_SEED: u64 = 42;

/// Default k-means iteration cap
pub const CLUSTERING_MAX_ITER: usize = 300;

/// Default number of clusters requested by callers that do not choose one
pub const DEFAULT_CLUSTERS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterParams {
    pub seed: u64,
    pub max_iter: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            seed: CLUSTERING_SEED,
            max_iter: CLUSTERING_MAX_ITER,
        }
    }
}

/// Perform K-Means clustering using Lloyd's algorithm
///
/// # Arguments
/// * `rows` - Input data where each inner vec is a sample
/// * `k` - Number of clusters, capped at the number of rows
/// * `max_iter` - Maximum iterations for convergence
/// * `seed` - Random seed for reproducibility
///
/// # Returns
/// One cluster label per row (0-indexed), or an error when k-means is undefined
/// for the input or the backend fails.
pub fn kmeans_lloyd(rows: &[Vec<f64>], k: usize, max_iter: usize, seed: u64) -> Result<Vec<usize>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let (n, f) = (rows.len(), rows[0].len());
    let k = k.min(n);
    if k < 2 {
        return Err(RecommendError::Clustering(format!(
            "k-means needs at least 2 clusters, got {}",
            k
        )));
    }
    if rows.iter().any(|r| r.len() != f) {
        return Err(RecommendError::Clustering(
            "rows have inconsistent dimensionality".to_string(),
        ));
    }

    // Flatten row-major data
    let x: DenseMatrix<f64> = DenseMatrix::from_iterator(rows.iter().flatten().copied(), n, f, 0);

    let params = KMeansParameters {
        k,
        max_iter,
        seed: Some(seed),
    };

    let km: KMeans<f64, usize, DenseMatrix<f64>, Vec<usize>> =
        KMeans::fit(&x, params).map_err(|e| RecommendError::Clustering(e.to_string()))?;

    let labels: Vec<usize> = km
        .predict(&x)
        .map_err(|e| RecommendError::Clustering(e.to_string()))?;

    Ok(labels)
}

/// Cluster labels for `tracks`, one per track in input order.
///
/// Falls back to all-zero labels whenever clustering is undefined or fails.
pub fn cluster_tracks(tracks: &[Track], n_clusters: usize, params: &ClusterParams) -> Vec<usize> {
    let n = tracks.len();
    if n < n_clusters {
        debug!(
            "Fewer tracks ({}) than clusters ({}); assigning every track to cluster 0",
            n, n_clusters
        );
        return vec![0; n];
    }
    if n == 0 {
        return Vec::new();
    }

    let k = n_clusters.min(n);
    info!("Clustering {} tracks into {} clusters (seed={})", n, k, params.seed);

    let batch = normalise_tracks(tracks);
    if batch.len() != n {
        warn!("Normalisation produced {} rows for {} tracks; using a single cluster", batch.len(), n);
        return vec![0; n];
    }
    let rows = batch.to_rows();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        kmeans_lloyd(&rows, k, params.max_iter, params.seed)
    }));

    match outcome {
        Ok(Ok(labels)) if labels.len() == n => {
            debug!("Cluster labels: {:?}", labels);
            labels
        }
        Ok(Ok(labels)) => {
            warn!("k-means returned {} labels for {} tracks; using a single cluster", labels.len(), n);
            vec![0; n]
        }
        Ok(Err(e)) => {
            warn!("Error clustering tracks: {}", e);
            vec![0; n]
        }
        Err(_) => {
            warn!("k-means backend panicked; using a single cluster");
            vec![0; n]
        }
    }
}
