//! Tolerance pre-filter on the key mood dimensions.
//!
//! A candidate is admitted only if valence, energy and danceability each lie
//! within `tolerance` of the target (raw values, missing = 0.0). Checks run in
//! that order and stop at the first violation.

use log::{debug, trace};

use crate::features::{FeatureVector, NumericFeature, Track};

pub const DEFAULT_TOLERANCE: f64 = 0.3;

/// First key dimension on which `candidate` strays more than `tolerance` from
/// `target`, with the offending gap.
pub fn first_violation(
    target: &FeatureVector,
    candidate: &FeatureVector,
    tolerance: f64,
) -> Option<(NumericFeature, f64)> {
    NumericFeature::KEY.iter().find_map(|&f| {
        let diff = (target.value_or_zero(f) - candidate.value_or_zero(f)).abs();
        (diff > tolerance).then_some((f, diff))
    })
}

#[inline]
pub fn within_tolerance(target: &FeatureVector, candidate: &FeatureVector, tolerance: f64) -> bool {
    first_violation(target, candidate, tolerance).is_none()
}

/// Candidates within `tolerance` of `target`, in input order.
///
/// ```
/// use tunespace::features::{FeatureVector, NumericFeature, Track};
/// use tunespace::filter::filter_by_feature_ranges;
///
/// let target = Track::new("t", FeatureVector::default().with(NumericFeature::Valence, 0.8));
/// let near = Track::new("a", FeatureVector::default().with(NumericFeature::Valence, 0.7));
/// let far = Track::new("b", FeatureVector::default().with(NumericFeature::Valence, 0.1));
///
/// let kept = filter_by_feature_ranges(&target, &[near, far], 0.3);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].id, "a");
/// ```
pub fn filter_by_feature_ranges(target: &Track, candidates: &[Track], tolerance: f64) -> Vec<Track> {
    let kept: Vec<Track> = candidates
        .iter()
        .filter(|c| match first_violation(&target.features, &c.features, tolerance) {
            Some((f, diff)) => {
                trace!("Rejecting {}: {} differs by {:.3} > {:.3}", c.id, f, diff, tolerance);
                false
            }
            None => true,
        })
        .cloned()
        .collect();

    debug!(
        "Tolerance filter kept {}/{} candidates (tolerance={})",
        kept.len(),
        candidates.len(),
        tolerance
    );
    kept
}

/// Candidates whose `name` metadata does not contain `needle`, compared
/// case-insensitively and ignoring surrounding whitespace.
///
/// Tracks without a string `name` are kept. An empty needle keeps everything.
pub fn exclude_by_name(candidates: &[Track], needle: &str) -> Vec<Track> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.to_vec();
    }

    let kept: Vec<Track> = candidates
        .iter()
        .filter(|c| match c.metadata.get("name").and_then(|v| v.as_str()) {
            Some(name) => !name.to_lowercase().contains(&needle),
            None => true,
        })
        .cloned()
        .collect();

    debug!(
        "Name filter '{}' kept {}/{} candidates",
        needle,
        kept.len(),
        candidates.len()
    );
    kept
}
