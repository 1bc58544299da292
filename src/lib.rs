//! # tunespace
//!
//! Content-based track similarity and ranking over audio feature vectors.
//!
//! Tracks carry nine numeric audio features (valence, energy, danceability,
//! tempo, ...) plus a few categorical ones. The engine ranks a candidate pool
//! against a target track with one of four methods:
//!
//! - `cosine` / `euclidean`: similarity over a median-imputed, standardised
//!   batch made of the target and its candidates;
//! - `weighted`: per-dimension weighted gap over raw values;
//! - `feature_based`: the weighted gap mixed with mood, style and tempo
//!   sub-scores.
//!
//! Around ranking sit a tolerance pre-filter on the key mood dimensions, batch
//! analytics (similarity matrices, k-means clustering, diversity, per-feature
//! summaries) and a hot-swappable weight table.
//!
//! ```
//! use tunespace::builder::RecommenderBuilder;
//! use tunespace::features::{FeatureVector, NumericFeature, Track};
//!
//! let engine = RecommenderBuilder::new()
//!     .with_weight(NumericFeature::Tempo, 0.5)
//!     .build()
//!     .unwrap();
//!
//! let target = Track::new("t", FeatureVector::from_values([0.5; 9]));
//! let pool = vec![
//!     Track::new("a", FeatureVector::from_values([0.4; 9])),
//!     Track::new("b", FeatureVector::from_values([0.9; 9])),
//! ];
//! let ranked = engine.rank(&target, &pool, 1, "weighted").unwrap();
//! assert_eq!(ranked[0].id(), "a");
//! ```

pub mod analysis;
pub mod builder;
pub mod clustering;
pub mod core;
pub mod diversity;
pub mod error;
pub mod features;
pub mod filter;
pub mod normalise;
pub mod scoring;
pub mod similarity;
pub mod weights;

pub use crate::builder::RecommenderBuilder;
pub use crate::core::{RankingMethod, RecommendRequest, Recommender, RecommenderConfig};
pub use crate::error::{RecommendError, Result};
pub use crate::features::{FeatureVector, NumericFeature, ScoredTrack, Track};
pub use crate::similarity::SimilarityMethod;
pub use crate::weights::{SharedWeights, WeightTable};

#[cfg(test)]
mod tests;
