//! Feature vector model: the fixed set of audio-feature dimensions and the
//! records that carry them.
//!
//! A [`FeatureVector`] holds nine numeric dimensions in a fixed order plus three
//! categorical ones (key, mode, time signature). Every field is optional so that
//! sparse catalog records deserialize as-is; absent values resolve to explicit
//! per-field defaults (0.0, or 120 BPM for tempo) instead of erroring.
//!
//! A [`Track`] wraps a vector with an opaque id and arbitrary caller metadata
//! that the engine passes through untouched. Ranking produces [`ScoredTrack`]s.
//!
//! # Examples
//!
//! ```
//! use tunespace::features::{FeatureVector, NumericFeature, Track};
//!
//! let fv = FeatureVector::default()
//!     .with(NumericFeature::Valence, 0.9)
//!     .with(NumericFeature::Energy, 0.7);
//!
//! assert_eq!(fv.value_or_zero(NumericFeature::Valence), 0.9);
//! assert_eq!(fv.value_or_zero(NumericFeature::Tempo), 0.0);
//! assert_eq!(fv.value_or_default(NumericFeature::Tempo), 120.0);
//!
//! let track = Track::new("t1", fv).with_metadata("name", "Song");
//! assert_eq!(track.metadata["name"], "Song");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of numeric dimensions used for similarity computation.
pub const N_NUMERIC: usize = 9;

/// Tempo assumed when a record carries none.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// Numeric audio-feature dimensions, in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    Danceability,
    Energy,
    Valence,
    Tempo,
    Loudness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Speechiness,
}

impl NumericFeature {
    pub const ALL: [NumericFeature; N_NUMERIC] = [
        NumericFeature::Danceability,
        NumericFeature::Energy,
        NumericFeature::Valence,
        NumericFeature::Tempo,
        NumericFeature::Loudness,
        NumericFeature::Acousticness,
        NumericFeature::Instrumentalness,
        NumericFeature::Liveness,
        NumericFeature::Speechiness,
    ];

    /// Dimensions checked by the tolerance filter, in check order.
    pub const KEY: [NumericFeature; 3] = [
        NumericFeature::Valence,
        NumericFeature::Energy,
        NumericFeature::Danceability,
    ];

    /// Position of this dimension inside a numeric row.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericFeature::Danceability => "danceability",
            NumericFeature::Energy => "energy",
            NumericFeature::Valence => "valence",
            NumericFeature::Tempo => "tempo",
            NumericFeature::Loudness => "loudness",
            NumericFeature::Acousticness => "acousticness",
            NumericFeature::Instrumentalness => "instrumentalness",
            NumericFeature::Liveness => "liveness",
            NumericFeature::Speechiness => "speechiness",
        }
    }

    /// Value used when a record does not carry this dimension.
    #[inline]
    pub fn default_value(self) -> f64 {
        match self {
            NumericFeature::Tempo => DEFAULT_TEMPO,
            _ => 0.0,
        }
    }

    /// Semantic range of the dimension as reported by the catalog.
    ///
    /// Tempo is in BPM and loudness in dB; everything else is a unit score.
    /// Values outside the range are not rejected, the range is informative.
    pub fn range(self) -> (f64, f64) {
        match self {
            NumericFeature::Tempo => (0.0, 250.0),
            NumericFeature::Loudness => (-60.0, 0.0),
            _ => (0.0, 1.0),
        }
    }
}

impl fmt::Display for NumericFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical dimensions carried alongside the numeric ones.
///
/// Never used for similarity; the normaliser passes them through unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Categorical {
    /// Pitch class in [0, 11]; catalogs use -1 for "no key detected".
    pub key: Option<i32>,
    /// 0 = minor, 1 = major
    pub mode: Option<i32>,
    pub time_signature: Option<i32>,
}

/// Nine numeric plus three categorical audio features of one song.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loudness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acousticness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrumentalness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speechiness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<i32>,
}

impl FeatureVector {
    /// Builds a vector with every numeric dimension present, in canonical order.
    pub fn from_values(values: [f64; N_NUMERIC]) -> Self {
        NumericFeature::ALL
            .iter()
            .fold(Self::default(), |fv, &f| fv.with(f, values[f.index()]))
    }

    #[inline]
    pub fn get(&self, feature: NumericFeature) -> Option<f64> {
        match feature {
            NumericFeature::Danceability => self.danceability,
            NumericFeature::Energy => self.energy,
            NumericFeature::Valence => self.valence,
            NumericFeature::Tempo => self.tempo,
            NumericFeature::Loudness => self.loudness,
            NumericFeature::Acousticness => self.acousticness,
            NumericFeature::Instrumentalness => self.instrumentalness,
            NumericFeature::Liveness => self.liveness,
            NumericFeature::Speechiness => self.speechiness,
        }
    }

    fn slot_mut(&mut self, feature: NumericFeature) -> &mut Option<f64> {
        match feature {
            NumericFeature::Danceability => &mut self.danceability,
            NumericFeature::Energy => &mut self.energy,
            NumericFeature::Valence => &mut self.valence,
            NumericFeature::Tempo => &mut self.tempo,
            NumericFeature::Loudness => &mut self.loudness,
            NumericFeature::Acousticness => &mut self.acousticness,
            NumericFeature::Instrumentalness => &mut self.instrumentalness,
            NumericFeature::Liveness => &mut self.liveness,
            NumericFeature::Speechiness => &mut self.speechiness,
        }
    }

    /// Returns a copy with `feature` set to `value`.
    pub fn with(mut self, feature: NumericFeature, value: f64) -> Self {
        *self.slot_mut(feature) = Some(value);
        self
    }

    /// Returns a copy with `feature` removed.
    pub fn without(mut self, feature: NumericFeature) -> Self {
        *self.slot_mut(feature) = None;
        self
    }

    /// Value of `feature`, 0.0 when absent (tempo included).
    #[inline]
    pub fn value_or_zero(&self, feature: NumericFeature) -> f64 {
        self.get(feature).unwrap_or(0.0)
    }

    /// Value of `feature`, falling back to [`NumericFeature::default_value`].
    #[inline]
    pub fn value_or_default(&self, feature: NumericFeature) -> f64 {
        self.get(feature).unwrap_or_else(|| feature.default_value())
    }

    /// All numeric dimensions in canonical order, absent ones as `None`.
    pub fn numeric(&self) -> [Option<f64>; N_NUMERIC] {
        NumericFeature::ALL.map(|f| self.get(f))
    }

    /// All numeric dimensions in canonical order, absent ones as 0.0.
    pub fn raw_values(&self) -> [f64; N_NUMERIC] {
        NumericFeature::ALL.map(|f| self.value_or_zero(f))
    }

    pub fn categorical(&self) -> Categorical {
        Categorical {
            key: self.key,
            mode: self.mode,
            time_signature: self.time_signature,
        }
    }
}

/// A catalog item: opaque id, audio features and passthrough metadata.
///
/// Serializes as a flat record, features and metadata inlined next to `id`,
/// which is the shape the upstream catalog produces.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(flatten)]
    pub features: FeatureVector,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Track {
    pub fn new(id: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            id: id.into(),
            features,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A ranked track; serializes as the track record plus `similarity_score`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredTrack {
    #[serde(flatten)]
    pub track: Track,
    #[serde(rename = "similarity_score")]
    pub score: f64,
}

impl ScoredTrack {
    #[inline]
    pub fn new(track: Track, score: f64) -> Self {
        Self { track, score }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.track.id
    }
}
