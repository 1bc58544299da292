//! Per-dimension importance weights.
//!
//! A [`WeightTable`] assigns exactly one strictly positive, finite weight to
//! every numeric dimension; the invariant is enforced on construction and on
//! deserialization, so a table that exists is always valid.
//!
//! [`SharedWeights`] is the process-wide handle the engine reads from. Reloading
//! replaces the whole table at once: readers take an `Arc` snapshot at the start
//! of a call and keep using it, so a ranking never mixes two tables.
//!
//! # Examples
//!
//! ```
//! use tunespace::features::NumericFeature;
//! use tunespace::weights::WeightTable;
//!
//! let w = WeightTable::default();
//! assert_eq!(w.weight(NumericFeature::Valence), 1.3);
//! assert!((w.total() - 8.4).abs() < 1e-12);
//!
//! assert!(WeightTable::new([1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0]).is_err());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};
use crate::features::{NumericFeature, N_NUMERIC};

/// Default weights, in canonical dimension order.
pub const DEFAULT_WEIGHTS: [f64; N_NUMERIC] = [
    1.2, // danceability
    1.1, // energy
    1.3, // valence
    0.8, // tempo
    0.6, // loudness
    1.0, // acousticness
    0.9, // instrumentalness
    0.7, // liveness
    0.8, // speechiness
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<NumericFeature, f64>",
    into = "BTreeMap<NumericFeature, f64>"
)]
pub struct WeightTable {
    weights: [f64; N_NUMERIC],
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl WeightTable {
    /// Validates and wraps weights given in canonical dimension order.
    pub fn new(weights: [f64; N_NUMERIC]) -> Result<Self> {
        for f in NumericFeature::ALL {
            let w = weights[f.index()];
            if !(w.is_finite() && w > 0.0) {
                return Err(RecommendError::InvalidWeight(format!(
                    "weight for {} must be strictly positive and finite, got {}",
                    f, w
                )));
            }
        }
        Ok(Self { weights })
    }

    /// Builds a table from `(dimension, weight)` pairs covering every dimension once.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NumericFeature, f64)>,
    {
        let mut slots: [Option<f64>; N_NUMERIC] = [None; N_NUMERIC];
        for (f, w) in pairs {
            if slots[f.index()].replace(w).is_some() {
                return Err(RecommendError::InvalidWeight(format!(
                    "duplicate weight for {}",
                    f
                )));
            }
        }

        let mut weights = [0.0; N_NUMERIC];
        for f in NumericFeature::ALL {
            weights[f.index()] = slots[f.index()].ok_or_else(|| {
                RecommendError::InvalidWeight(format!("missing weight for {}", f))
            })?;
        }
        Self::new(weights)
    }

    #[inline]
    pub fn weight(&self, feature: NumericFeature) -> f64 {
        self.weights[feature.index()]
    }

    /// Weights in canonical dimension order.
    #[inline]
    pub fn as_array(&self) -> &[f64; N_NUMERIC] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NumericFeature, f64)> + '_ {
        NumericFeature::ALL.iter().map(move |&f| (f, self.weight(f)))
    }
}

impl TryFrom<BTreeMap<NumericFeature, f64>> for WeightTable {
    type Error = RecommendError;

    fn try_from(map: BTreeMap<NumericFeature, f64>) -> Result<Self> {
        Self::from_pairs(map)
    }
}

impl From<WeightTable> for BTreeMap<NumericFeature, f64> {
    fn from(table: WeightTable) -> Self {
        table.iter().collect()
    }
}

/// Shared, atomically replaceable weight table.
///
/// Cloning the handle shares the same underlying slot.
#[derive(Clone, Debug, Default)]
pub struct SharedWeights {
    current: Arc<RwLock<Arc<WeightTable>>>,
}

impl SharedWeights {
    pub fn new(table: WeightTable) -> Self {
        debug!("Creating shared weight table: {:?}", table.as_array());
        Self {
            current: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// Current table; stays valid even if another thread replaces it.
    pub fn snapshot(&self) -> Arc<WeightTable> {
        Arc::clone(&self.current.read())
    }

    /// Swaps in a new table as a whole, returning the previous one.
    pub fn replace(&self, table: WeightTable) -> Arc<WeightTable> {
        info!("Replacing weight table: {:?}", table.as_array());
        std::mem::replace(&mut *self.current.write(), Arc::new(table))
    }
}
