//! Per-feature analytics that do not rank anything: the gap between two tracks
//! on every dimension, and descriptive statistics over a batch.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, NumericFeature, Track};
use crate::normalise::median;

/// Descriptive statistics of one dimension over the values present in a batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0.0 for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl FeatureSummary {
    /// `None` when `values` is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sorted = values.to_vec();
        let median = median(&mut sorted)?;

        Some(Self {
            mean,
            std,
            min,
            max,
            median,
        })
    }
}

/// Absolute difference between `a` and `b` on every numeric dimension.
///
/// Missing values count as 0.0.
///
/// ```
/// use tunespace::analysis::analyze_feature_differences;
/// use tunespace::features::{FeatureVector, NumericFeature};
///
/// let a = FeatureVector::default().with(NumericFeature::Energy, 0.9);
/// let b = FeatureVector::default().with(NumericFeature::Energy, 0.4);
/// let diffs = analyze_feature_differences(&a, &b);
/// assert_eq!(diffs.len(), 9);
/// assert!((diffs[&NumericFeature::Energy] - 0.5).abs() < 1e-12);
/// assert_eq!(diffs[&NumericFeature::Tempo], 0.0);
/// ```
pub fn analyze_feature_differences(a: &FeatureVector, b: &FeatureVector) -> BTreeMap<NumericFeature, f64> {
    NumericFeature::ALL
        .iter()
        .map(|&f| (f, (a.value_or_zero(f) - b.value_or_zero(f)).abs()))
        .collect()
}

/// Statistics for every dimension that has at least one value in `tracks`.
pub fn feature_summary(tracks: &[Track]) -> BTreeMap<NumericFeature, FeatureSummary> {
    let summary: BTreeMap<NumericFeature, FeatureSummary> = NumericFeature::ALL
        .iter()
        .filter_map(|&f| {
            let values: Vec<f64> = tracks
                .iter()
                .filter_map(|t| t.features.get(f))
                .filter(|v| !v.is_nan())
                .collect();
            FeatureSummary::from_values(&values).map(|s| (f, s))
        })
        .collect();

    debug!(
        "Summarised {} dimensions over {} tracks",
        summary.len(),
        tracks.len()
    );
    summary
}
