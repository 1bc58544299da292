//! Recommender: the ranking engine facade.
//!
//! A [`Recommender`] owns the (shared, swappable) weight table and the engine
//! settings, and exposes every operation over plain [`Track`] records:
//!
//! - ranking: [`Recommender::find_similar_tracks`] (cosine / Euclidean over a
//!   normalised batch), [`Recommender::weighted_similarity`] and
//!   [`Recommender::feature_based_filtering`] (raw-value scorers), and the
//!   dispatching entry points [`Recommender::recommend`] / [`Recommender::rank`];
//! - pre-filtering: [`Recommender::filter_by_feature_ranges`];
//! - analytics: similarity matrices, clustering, diversity, feature summaries.
//!
//! The engine keeps no state between calls besides its configuration, so one
//! instance can be cloned and shared across threads freely. Each call takes a
//! single weight snapshot up front.
//!
//! # Examples
//!
//! ```
//! use tunespace::core::{RecommendRequest, Recommender};
//! use tunespace::features::{FeatureVector, NumericFeature, Track};
//!
//! let engine = Recommender::new();
//!
//! let target = Track::new("seed", FeatureVector::default()
//!     .with(NumericFeature::Valence, 0.9)
//!     .with(NumericFeature::Energy, 0.7));
//! let candidates = vec![
//!     Track::new("sad", FeatureVector::default()
//!         .with(NumericFeature::Valence, 0.1)
//!         .with(NumericFeature::Energy, 0.7)),
//!     Track::new("happy", FeatureVector::default()
//!         .with(NumericFeature::Valence, 0.85)
//!         .with(NumericFeature::Energy, 0.7)),
//! ];
//!
//! let ranked = engine.recommend(&target, &candidates, &RecommendRequest::default());
//! assert_eq!(ranked[0].id(), "happy");
//!
//! assert!(engine.rank(&target, &candidates, 5, "manhattan").is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::{self, FeatureSummary};
use crate::builder::RecommenderBuilder;
use crate::clustering::{self, ClusterParams};
use crate::diversity;
use crate::error::{RecommendError, Result};
use crate::features::{FeatureVector, NumericFeature, ScoredTrack, Track};
use crate::filter;
use crate::normalise::{normalise_tracks, NormalisedBatch};
use crate::scoring::{self, ComponentScores};
use crate::similarity::{similarity_matrix, SimilarityMethod};
use crate::weights::{SharedWeights, WeightTable};

/// Number of results returned when a request does not say otherwise.
pub const DEFAULT_RESULTS: usize = 20;

/// Ranking strategy selectable by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMethod {
    Cosine,
    Euclidean,
    Weighted,
    #[default]
    FeatureBased,
}

impl RankingMethod {
    pub const EXPECTED: &'static str = "'cosine', 'euclidean', 'weighted' or 'feature_based'";

    pub fn as_str(self) -> &'static str {
        match self {
            RankingMethod::Cosine => "cosine",
            RankingMethod::Euclidean => "euclidean",
            RankingMethod::Weighted => "weighted",
            RankingMethod::FeatureBased => "feature_based",
        }
    }

    /// Matrix metric behind this method, if it is a normalised-batch method.
    pub fn similarity_method(self) -> Option<SimilarityMethod> {
        match self {
            RankingMethod::Cosine => Some(SimilarityMethod::Cosine),
            RankingMethod::Euclidean => Some(SimilarityMethod::Euclidean),
            RankingMethod::Weighted | RankingMethod::FeatureBased => None,
        }
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingMethod {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(RankingMethod::Cosine),
            "euclidean" => Ok(RankingMethod::Euclidean),
            "weighted" => Ok(RankingMethod::Weighted),
            "feature_based" => Ok(RankingMethod::FeatureBased),
            other => Err(RecommendError::InvalidMethod {
                method: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// One ranking request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub method: RankingMethod,
    #[serde(default = "default_results")]
    pub n: usize,
    /// Apply the tolerance pre-filter with this tolerance.
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Drop candidates whose `name` contains this text (usually the seed's
    /// search query, so the seed's own versions are not recommended back).
    #[serde(default)]
    pub exclude_name: Option<String>,
}

fn default_results() -> usize {
    DEFAULT_RESULTS
}

impl Default for RecommendRequest {
    fn default() -> Self {
        Self {
            method: RankingMethod::default(),
            n: DEFAULT_RESULTS,
            tolerance: None,
            exclude_name: None,
        }
    }
}

impl RecommendRequest {
    pub fn new(method: RankingMethod, n: usize) -> Self {
        Self {
            method,
            n,
            tolerance: None,
            exclude_name: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn without_tolerance(mut self) -> Self {
        self.tolerance = None;
        self
    }

    pub fn excluding_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_name = Some(name.into());
        self
    }
}

/// Engine settings fixed at build time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub default_results: usize,
    pub tolerance: f64,
    pub tempo_ceiling: f64,
    pub clustering: ClusterParams,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            default_results: DEFAULT_RESULTS,
            tolerance: filter::DEFAULT_TOLERANCE,
            tempo_ceiling: scoring::DEFAULT_TEMPO_CEILING,
            clustering: ClusterParams::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Recommender {
    weights: SharedWeights,
    config: RecommenderConfig,
}

impl Recommender {
    /// Engine with the default weights and settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RecommenderBuilder {
        RecommenderBuilder::new()
    }

    pub(crate) fn from_parts(weights: WeightTable, config: RecommenderConfig) -> Self {
        Self {
            weights: SharedWeights::new(weights),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Snapshot of the weight table currently in force.
    #[inline]
    pub fn weights(&self) -> Arc<WeightTable> {
        self.weights.snapshot()
    }

    /// Atomically replaces the weight table for every clone of this engine.
    pub fn replace_weights(&self, table: WeightTable) -> Arc<WeightTable> {
        self.weights.replace(table)
    }

    /// Request using the configured result count, with the tolerance pre-filter
    /// enabled at the configured tolerance.
    pub fn request(&self, method: RankingMethod) -> RecommendRequest {
        RecommendRequest::new(method, self.config.default_results).with_tolerance(self.config.tolerance)
    }

    /// Median-imputes and standardises the feature vectors of `tracks`.
    pub fn prepare_features(&self, tracks: &[Track]) -> NormalisedBatch {
        normalise_tracks(tracks)
    }

    /// Similarity matrix of `tracks` after normalisation.
    ///
    /// `method` must be "cosine" or "euclidean". Fewer than two tracks yields an
    /// empty matrix.
    pub fn calculate_similarity_matrix(&self, tracks: &[Track], method: &str) -> Result<Vec<Vec<f64>>> {
        let method = SimilarityMethod::from_str(method)?;
        if tracks.len() < 2 {
            return Ok(Vec::new());
        }
        let batch = self.prepare_features(tracks);
        Ok(similarity_matrix(&batch.rows, method))
    }

    /// Candidates ranked by cosine or Euclidean similarity to `target`, computed
    /// over the normalised batch `[target] + candidates`.
    pub fn find_similar_tracks(
        &self,
        target: &Track,
        candidates: &[Track],
        n: usize,
        method: SimilarityMethod,
    ) -> Vec<ScoredTrack> {
        if candidates.is_empty() {
            return Vec::new();
        }
        info!(
            "Finding tracks similar to {} among {} candidates ({})",
            target.id,
            candidates.len(),
            method
        );

        let batch = normalise_tracks(std::iter::once(target).chain(candidates));
        if batch.len() != candidates.len() + 1 {
            debug!("Normalisation produced no usable rows");
            return Vec::new();
        }

        let matrix = similarity_matrix(&batch.rows, method);
        let Some(target_row) = matrix.first() else {
            return Vec::new();
        };

        let scored = candidates
            .iter()
            .zip(target_row.iter().skip(1))
            .map(|(c, &s)| ScoredTrack::new(c.clone(), s))
            .collect();
        scoring::top_n(scored, n)
    }

    /// Candidates ranked by the weighted dissimilarity model over raw values.
    pub fn weighted_similarity(&self, target: &Track, candidates: &[Track], n: usize) -> Vec<ScoredTrack> {
        if candidates.is_empty() {
            return Vec::new();
        }
        info!(
            "Weighted ranking of {} candidates against {}",
            candidates.len(),
            target.id
        );
        let weights = self.weights();
        scoring::rank_by(candidates, n, |c| {
            scoring::weighted_score(&weights, &target.features, &c.features)
        })
    }

    /// Candidates ranked by the composite overall/mood/style/tempo score.
    pub fn feature_based_filtering(&self, target: &Track, candidates: &[Track], n: usize) -> Vec<ScoredTrack> {
        if candidates.is_empty() {
            return Vec::new();
        }
        info!(
            "Feature-based ranking of {} candidates against {}",
            candidates.len(),
            target.id
        );
        let weights = self.weights();
        let ceiling = self.config.tempo_ceiling;
        scoring::rank_by(candidates, n, |c| {
            scoring::composite_score(&weights, &target.features, &c.features, ceiling)
        })
    }

    /// Sub-score breakdown of the composite score for one pair.
    pub fn component_scores(&self, target: &FeatureVector, candidate: &FeatureVector) -> ComponentScores {
        scoring::component_scores(&self.weights(), target, candidate, self.config.tempo_ceiling)
    }

    /// Candidates within `tolerance` of `target` on valence, energy and
    /// danceability, in input order.
    pub fn filter_by_feature_ranges(&self, target: &Track, candidates: &[Track], tolerance: f64) -> Vec<Track> {
        filter::filter_by_feature_ranges(target, candidates, tolerance)
    }

    /// Runs one ranking request: optional name exclusion, optional tolerance
    /// pre-filter, then the chosen method, truncated to `request.n`.
    ///
    /// When the tolerance pre-filter rejects every candidate the pool it was
    /// given is ranked instead.
    pub fn recommend(&self, target: &Track, candidates: &[Track], request: &RecommendRequest) -> Vec<ScoredTrack> {
        let named;
        let candidates: &[Track] = match request.exclude_name.as_deref() {
            Some(name) => {
                named = filter::exclude_by_name(candidates, name);
                &named
            }
            None => candidates,
        };

        let filtered;
        let pool: &[Track] = match request.tolerance {
            Some(tolerance) => {
                filtered = self.filter_by_feature_ranges(target, candidates, tolerance);
                if filtered.is_empty() {
                    debug!(
                        "No candidate within tolerance {}; ranking all {} candidates",
                        tolerance,
                        candidates.len()
                    );
                    candidates
                } else {
                    &filtered
                }
            }
            None => candidates,
        };

        match request.method {
            RankingMethod::Cosine => {
                self.find_similar_tracks(target, pool, request.n, SimilarityMethod::Cosine)
            }
            RankingMethod::Euclidean => {
                self.find_similar_tracks(target, pool, request.n, SimilarityMethod::Euclidean)
            }
            RankingMethod::Weighted => self.weighted_similarity(target, pool, request.n),
            RankingMethod::FeatureBased => self.feature_based_filtering(target, pool, request.n),
        }
    }

    /// String entry point: parses `method` and ranks without pre-filtering.
    pub fn rank(&self, target: &Track, candidates: &[Track], n: usize, method: &str) -> Result<Vec<ScoredTrack>> {
        let method = RankingMethod::from_str(method)?;
        Ok(self.recommend(target, candidates, &RecommendRequest::new(method, n)))
    }

    /// k-means labels for `tracks` using the engine's clustering settings.
    pub fn cluster_tracks(&self, tracks: &[Track], n_clusters: usize) -> Vec<usize> {
        clustering::cluster_tracks(tracks, n_clusters, &self.config.clustering)
    }

    /// Normalised mean pairwise distance of `tracks`, in [0, 1].
    pub fn diversity_score(&self, tracks: &[Track]) -> f64 {
        diversity::diversity_score(tracks)
    }

    pub fn analyze_feature_differences(&self, a: &Track, b: &Track) -> BTreeMap<NumericFeature, f64> {
        analysis::analyze_feature_differences(&a.features, &b.features)
    }

    pub fn feature_summary(&self, tracks: &[Track]) -> BTreeMap<NumericFeature, FeatureSummary> {
        analysis::feature_summary(tracks)
    }
}
