//! Batch normalisation of feature vectors.
//!
//! Two steps, applied per numeric dimension across the whole batch:
//!
//! 1. **Imputation**: missing values are replaced by the dimension's median over
//!    the values present in the batch. A dimension absent from every row falls
//!    back to its field default (0.0, tempo 120).
//! 2. **Standard scaling** (only when the batch has more than one row): zero mean
//!    and unit population variance, via smartcore's `StandardScaler`. Constant
//!    dimensions, including ones that vary only by rounding error, map to 0.0.
//!
//! Categorical dimensions are carried through untouched.
//!
//! The batch statistics are recomputed on every call; nothing is fitted once and
//! reused, so the same track normalises differently in different batches.

use log::{debug, trace, warn};
use smartcore::api::{Transformer, UnsupervisedEstimator};
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::preprocessing::numerical::{StandardScaler, StandardScalerParameters};

use crate::error::{RecommendError, Result};
use crate::features::{Categorical, FeatureVector, NumericFeature, Track, N_NUMERIC};

/// Numeric rows after imputation (and scaling), plus the untouched categoricals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalisedBatch {
    pub rows: Vec<[f64; N_NUMERIC]>,
    pub categorical: Vec<Categorical>,
}

impl NormalisedBatch {
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// Column of normalised values for one dimension.
    pub fn column(&self, feature: NumericFeature) -> Vec<f64> {
        self.rows.iter().map(|r| r[feature.index()]).collect()
    }

    /// Owned row-major copy, the shape the clustering backend takes.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.to_vec()).collect()
    }
}

/// Median of `values`; `None` when empty. Sorts the slice in place.
///
/// Even-sized inputs average the two central values.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Fills every missing numeric value with its dimension's batch median.
pub fn impute_median(batch: &[FeatureVector]) -> Vec<[f64; N_NUMERIC]> {
    let fills: [f64; N_NUMERIC] = NumericFeature::ALL.map(|f| {
        let mut present: Vec<f64> = batch
            .iter()
            .filter_map(|fv| fv.get(f))
            .filter(|v| !v.is_nan())
            .collect();
        match median(&mut present) {
            Some(m) => m,
            None => {
                trace!("No {} values in batch, imputing default {}", f, f.default_value());
                f.default_value()
            }
        }
    });

    batch
        .iter()
        .map(|fv| {
            NumericFeature::ALL.map(|f| match fv.get(f) {
                Some(v) if !v.is_nan() => v,
                _ => fills[f.index()],
            })
        })
        .collect()
}

/// Whether a column's population variance is indistinguishable from rounding
/// noise: `var <= n·ε·var + (n·|mean|·ε)²`.
///
/// Values one ulp apart count as constant; exact equality is not required.
fn is_constant_column<I>(values: I, n: usize) -> bool
where
    I: Iterator<Item = f64> + Clone,
{
    let n_f = n as f64;
    let mean = values.clone().sum::<f64>() / n_f;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n_f;
    let eps = f64::EPSILON;
    let bound = n_f * eps * var + (n_f * mean * eps).powi(2);
    let constant = var <= bound;
    if constant && var > 0.0 {
        trace!("Treating column with variance {:e} as constant", var);
    }
    constant
}

/// Rescales each column to zero mean and unit variance.
///
/// Requires at least two rows. Constant and near-constant columns become
/// all-zero.
pub fn standardise(rows: &[[f64; N_NUMERIC]]) -> Result<Vec<[f64; N_NUMERIC]>> {
    let n = rows.len();
    if n < 2 {
        return Err(RecommendError::Normalisation(format!(
            "standard scaling needs at least 2 rows, got {}",
            n
        )));
    }

    let x: DenseMatrix<f64> =
        DenseMatrix::from_iterator(rows.iter().flat_map(|r| r.iter().copied()), n, N_NUMERIC, 0);

    let scaler = StandardScaler::fit(&x, StandardScalerParameters::default())
        .map_err(|e| RecommendError::Normalisation(e.to_string()))?;
    let scaled = scaler
        .transform(&x)
        .map_err(|e| RecommendError::Normalisation(e.to_string()))?;

    let constant: [bool; N_NUMERIC] = NumericFeature::ALL.map(|f| {
        let j = f.index();
        is_constant_column(rows.iter().map(|r| r[j]), n)
    });

    Ok((0..n)
        .map(|i| {
            let mut out = [0.0; N_NUMERIC];
            for (j, slot) in out.iter_mut().enumerate() {
                let v = *scaled.get((i, j));
                *slot = if constant[j] || !v.is_finite() { 0.0 } else { v };
            }
            out
        })
        .collect())
}

/// Imputes and, for batches larger than one, standardises `batch`.
///
/// An empty batch, or a scaling failure, yields an empty result.
pub fn normalise(batch: &[FeatureVector]) -> NormalisedBatch {
    if batch.is_empty() {
        return NormalisedBatch::default();
    }

    let categorical = batch.iter().map(|fv| fv.categorical()).collect();
    let imputed = impute_median(batch);

    let rows = if imputed.len() > 1 {
        match standardise(&imputed) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Dropping batch of {} rows: {}", imputed.len(), e);
                return NormalisedBatch::default();
            }
        }
    } else {
        debug!("Single-row batch, skipping variance scaling");
        imputed
    };

    NormalisedBatch { rows, categorical }
}

/// [`normalise`] over the feature vectors of `tracks`.
pub fn normalise_tracks<'a, I>(tracks: I) -> NormalisedBatch
where
    I: IntoIterator<Item = &'a Track>,
{
    let batch: Vec<FeatureVector> = tracks.into_iter().map(|t| t.features).collect();
    normalise(&batch)
}
