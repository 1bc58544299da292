use crate::clustering::ClusterParams;
use crate::core::{Recommender, RecommenderConfig};
use crate::error::{RecommendError, Result};
use crate::features::{NumericFeature, N_NUMERIC};
use crate::weights::{WeightTable, DEFAULT_WEIGHTS};

use log::{debug, info};

pub struct RecommenderBuilder {
    // Raw weights, validated in `build`
    weights: [f64; N_NUMERIC],

    // Engine settings
    default_results: usize,
    tolerance: f64,
    tempo_ceiling: f64,

    // k-means settings
    cluster_seed: u64,
    cluster_max_iter: usize,
}

impl Default for RecommenderBuilder {
    fn default() -> Self {
        debug!("Creating RecommenderBuilder with default parameters");
        let config = RecommenderConfig::default();
        Self {
            weights: DEFAULT_WEIGHTS,

            default_results: config.default_results,
            tolerance: config.tolerance,
            tempo_ceiling: config.tempo_ceiling,

            cluster_seed: config.clustering.seed,
            cluster_max_iter: config.clustering.max_iter,
        }
    }
}

impl RecommenderBuilder {
    pub fn new() -> Self {
        info!("Initializing new RecommenderBuilder");
        Self::default()
    }

    // -------------------- Weights --------------------

    /// Replace the whole weight table. Validation happens in `build`.
    pub fn with_weights(mut self, table: WeightTable) -> Self {
        info!("Setting weight table: {:?}", table.as_array());
        self.weights = *table.as_array();
        self
    }

    /// Override the weight of a single dimension.
    pub fn with_weight(mut self, feature: NumericFeature, weight: f64) -> Self {
        info!("Setting weight for {}: {}", feature, weight);
        self.weights[feature.index()] = weight;
        self
    }

    // -------------------- Ranking --------------------

    pub fn with_default_results(mut self, n: usize) -> Self {
        info!("Setting default result count: {}", n);
        self.default_results = n;
        self
    }

    /// Tolerance used by the pre-filter when a caller asks for the engine default.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        info!("Setting filter tolerance: {}", tolerance);
        self.tolerance = tolerance;
        self
    }

    /// Assumed maximum BPM of the composite tempo sub-score.
    pub fn with_tempo_ceiling(mut self, ceiling: f64) -> Self {
        info!("Setting tempo ceiling: {}", ceiling);
        self.tempo_ceiling = ceiling;
        self
    }

    // -------------------- Clustering --------------------

    pub fn with_cluster_seed(mut self, seed: u64) -> Self {
        info!("Setting clustering seed: {}", seed);
        self.cluster_seed = seed;
        self
    }

    pub fn with_cluster_max_iter(mut self, max_iter: usize) -> Self {
        info!("Setting clustering max_iter: {}", max_iter);
        self.cluster_max_iter = max_iter;
        self
    }

    // -------------------- Build --------------------

    pub fn build(self) -> Result<Recommender> {
        info!("Building Recommender");

        let weights = WeightTable::new(self.weights)?;
        debug!("Weight table validated, total weight {:.2}", weights.total());

        if !(0.0..=1.0).contains(&self.tolerance) {
            return Err(RecommendError::InvalidTolerance(self.tolerance));
        }
        if !(self.tempo_ceiling.is_finite() && self.tempo_ceiling > 0.0) {
            return Err(RecommendError::InvalidConfig(format!(
                "tempo ceiling must be strictly positive and finite, got {}",
                self.tempo_ceiling
            )));
        }
        if self.cluster_max_iter == 0 {
            return Err(RecommendError::InvalidConfig(
                "clustering max_iter must be at least 1".to_string(),
            ));
        }

        let config = RecommenderConfig {
            default_results: self.default_results,
            tolerance: self.tolerance,
            tempo_ceiling: self.tempo_ceiling,
            clustering: ClusterParams {
                seed: self.cluster_seed,
                max_iter: self.cluster_max_iter,
            },
        };
        debug!("Recommender config: {:?}", config);

        info!("Recommender built");
        Ok(Recommender::from_parts(weights, config))
    }
}
