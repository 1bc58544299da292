//! Diversity of a track set: the mean pairwise Euclidean distance between
//! normalised feature rows, divided by `sqrt(N_NUMERIC)` and capped at 1.0.
//!
//! The divisor approximates the largest typical distance between two
//! standardised rows; it is not a true bound, hence the cap.

use log::{debug, info};
use rayon::prelude::*;

use crate::features::{Track, N_NUMERIC};
use crate::normalise::normalise_tracks;
use crate::similarity::euclidean_distance;

/// Normalisation constant applied to the mean pairwise distance.
#[inline]
pub fn max_expected_distance() -> f64 {
    (N_NUMERIC as f64).sqrt()
}

/// Mean Euclidean distance over the strict upper triangle (`i < j`).
///
/// `None` when there are fewer than two rows.
pub fn mean_pairwise_distance<R>(rows: &[R]) -> Option<f64>
where
    R: AsRef<[f64]> + Sync,
{
    let n = rows.len();
    if n < 2 {
        return None;
    }

    let total: f64 = (0..n)
        .into_par_iter()
        .map(|i| {
            let a = rows[i].as_ref();
            ((i + 1)..n)
                .map(|j| euclidean_distance(a, rows[j].as_ref()))
                .sum::<f64>()
        })
        .sum();

    let pairs = n * (n - 1) / 2;
    Some(total / pairs as f64)
}

/// Diversity score in [0, 1]; higher means a more spread-out set.
///
/// ```
/// use tunespace::diversity::diversity_score;
/// use tunespace::features::{FeatureVector, Track};
///
/// let a = Track::new("a", FeatureVector::from_values([0.5; 9]));
/// let b = Track::new("b", FeatureVector::from_values([0.5; 9]));
/// assert_eq!(diversity_score(&[a.clone(), b]), 0.0);
/// assert_eq!(diversity_score(&[a]), 0.0);
/// ```
pub fn diversity_score(tracks: &[Track]) -> f64 {
    if tracks.len() < 2 {
        return 0.0;
    }
    info!("Computing diversity over {} tracks", tracks.len());

    let batch = normalise_tracks(tracks);
    let Some(mean) = mean_pairwise_distance(&batch.rows) else {
        debug!("Normalisation left fewer than 2 rows; diversity is 0");
        return 0.0;
    };

    let diversity = mean / max_expected_distance();
    debug!("Mean pairwise distance {:.4}, diversity {:.4}", mean, diversity);
    if diversity.is_nan() {
        return 0.0;
    }
    diversity.min(1.0)
}
