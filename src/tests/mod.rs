mod test_clustering;
mod test_filter;
mod test_similarity;
mod test_weights;

/// Absolute tolerance shared by the floating-point assertions
pub const EPS: f64 = 1e-9;
