//! Raw-value scorers: the weighted dissimilarity model and the four-part
//! composite built on top of it.
//!
//! Unlike the matrix metrics these read feature values as given, with no batch
//! normalisation, so a pair's score does not depend on the rest of the pool.
//! Every component converts a non-negative gap into a similarity with
//! `1 / (1 + gap)`.
//!
//! Composite mix (all gaps are absolute differences of raw values):
//!
//! - overall, weight 0.4: weighted mean of the per-dimension gaps
//! - mood, weight 0.3: `0.6·Δvalence + 0.4·Δenergy`
//! - style, weight 0.2: `0.5·Δacousticness + 0.5·Δinstrumentalness`
//! - tempo, weight 0.1: `Δtempo / 200`, the ceiling being an assumed maximum BPM
//!
//! Missing values count as 0.0, except tempo: every composite component reads a
//! missing tempo as 120 BPM, while the standalone [`weighted_score`] reads it as
//! 0.0. The mixed score is not clamped or re-normalised.

use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, NumericFeature, ScoredTrack, Track};
use crate::weights::WeightTable;

/// Assumed maximum tempo used to bring BPM onto a unit scale.
pub const DEFAULT_TEMPO_CEILING: f64 = 200.0;

/// Mixing coefficients of the composite score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeMix {
    pub overall: f64,
    pub mood: f64,
    pub style: f64,
    pub tempo: f64,
}

pub const COMPOSITE_MIX: CompositeMix = CompositeMix {
    overall: 0.4,
    mood: 0.3,
    style: 0.2,
    tempo: 0.1,
};

impl Default for CompositeMix {
    fn default() -> Self {
        COMPOSITE_MIX
    }
}

/// Breakdown of one composite evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComponentScores {
    pub weighted: f64,
    pub mood: f64,
    pub style: f64,
    pub tempo: f64,
    pub combined: f64,
}

#[inline]
fn inverse_gap(gap: f64) -> f64 {
    1.0 / (1.0 + gap)
}

/// Reads one dimension of a vector, resolving a missing value.
type ValueOf = fn(&FeatureVector, NumericFeature) -> f64;

#[inline]
fn gap(target: &FeatureVector, candidate: &FeatureVector, feature: NumericFeature) -> f64 {
    gap_by(FeatureVector::value_or_zero, target, candidate, feature)
}

#[inline]
fn gap_by(value: ValueOf, target: &FeatureVector, candidate: &FeatureVector, feature: NumericFeature) -> f64 {
    (value(target, feature) - value(candidate, feature)).abs()
}

fn weighted_score_by(
    value: ValueOf,
    weights: &WeightTable,
    target: &FeatureVector,
    candidate: &FeatureVector,
) -> f64 {
    let (weighted_diff, total_weight) = weights
        .iter()
        .fold((0.0, 0.0), |(diff, total), (f, w)| {
            (diff + w * gap_by(value, target, candidate, f), total + w)
        });

    if total_weight > 0.0 {
        inverse_gap(weighted_diff / total_weight)
    } else {
        0.0
    }
}

/// Weighted similarity of one pair: `1 / (1 + Σ wᵢ|Δᵢ| / Σ wᵢ)`.
///
/// Missing values count as 0.0, tempo included. Returns 0.0 if the weights sum
/// to zero, which a validated table never does.
///
/// ```
/// use tunespace::features::FeatureVector;
/// use tunespace::scoring::weighted_score;
/// use tunespace::weights::WeightTable;
///
/// let a = FeatureVector::from_values([0.5; 9]);
/// assert_eq!(weighted_score(&WeightTable::default(), &a, &a), 1.0);
/// ```
pub fn weighted_score(weights: &WeightTable, target: &FeatureVector, candidate: &FeatureVector) -> f64 {
    weighted_score_by(FeatureVector::value_or_zero, weights, target, candidate)
}

/// Mood agreement from valence and energy.
pub fn mood_score(target: &FeatureVector, candidate: &FeatureVector) -> f64 {
    let diff = 0.6 * gap(target, candidate, NumericFeature::Valence)
        + 0.4 * gap(target, candidate, NumericFeature::Energy);
    inverse_gap(diff)
}

/// Style agreement from acousticness and instrumentalness.
pub fn style_score(target: &FeatureVector, candidate: &FeatureVector) -> f64 {
    let diff = 0.5 * gap(target, candidate, NumericFeature::Acousticness)
        + 0.5 * gap(target, candidate, NumericFeature::Instrumentalness);
    inverse_gap(diff)
}

/// Tempo agreement; a missing tempo counts as 120 BPM.
pub fn tempo_score(target: &FeatureVector, candidate: &FeatureVector, ceiling: f64) -> f64 {
    let t = target.value_or_default(NumericFeature::Tempo) / ceiling;
    let c = candidate.value_or_default(NumericFeature::Tempo) / ceiling;
    inverse_gap((t - c).abs())
}

/// All four composite components and their mix for one pair.
pub fn component_scores(
    weights: &WeightTable,
    target: &FeatureVector,
    candidate: &FeatureVector,
    tempo_ceiling: f64,
) -> ComponentScores {
    // missing tempo is 120 in every component, the weighted one included
    let weighted = weighted_score_by(FeatureVector::value_or_default, weights, target, candidate);
    let mood = mood_score(target, candidate);
    let style = style_score(target, candidate);
    let tempo = tempo_score(target, candidate, tempo_ceiling);

    let mix = COMPOSITE_MIX;
    let combined =
        weighted * mix.overall + mood * mix.mood + style * mix.style + tempo * mix.tempo;

    ComponentScores {
        weighted,
        mood,
        style,
        tempo,
        combined,
    }
}

/// Composite score of one pair.
#[inline]
pub fn composite_score(
    weights: &WeightTable,
    target: &FeatureVector,
    candidate: &FeatureVector,
    tempo_ceiling: f64,
) -> f64 {
    component_scores(weights, target, candidate, tempo_ceiling).combined
}

#[inline]
fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Sorts by descending score and keeps the first `n`.
///
/// The sort is stable: equal scores keep their input order. NaN scores sort last.
pub fn top_n(mut scored: Vec<ScoredTrack>, n: usize) -> Vec<ScoredTrack> {
    scored.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    scored.truncate(n);
    trace!(
        "Top {} scores: {:?}",
        scored.len(),
        scored.iter().map(|s| s.score).collect::<Vec<_>>()
    );
    scored
}

/// Scores every candidate with `score`, then applies [`top_n`].
///
/// Candidates are scored in parallel; input order is kept for tie-breaking.
pub fn rank_by<F>(candidates: &[Track], n: usize, score: F) -> Vec<ScoredTrack>
where
    F: Fn(&Track) -> f64 + Sync,
{
    let scored = candidates
        .par_iter()
        .map(|c| ScoredTrack::new(c.clone(), score(c)))
        .collect();
    top_n(scored, n)
}
