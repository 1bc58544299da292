use approx::assert_abs_diff_eq;
use std::str::FromStr;

use crate::error::RecommendError;
use crate::normalise::normalise_tracks;
use crate::similarity::{
    cosine_similarity, euclidean_distance, euclidean_similarity, similarity_matrix,
    SimilarityMethod,
};
use crate::tests::test_data::random_tracks;
use crate::tests::EPS;

#[test]
fn test_cosine_basic() {
    assert_abs_diff_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0, epsilon = EPS);
    assert_abs_diff_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0, epsilon = EPS);
    assert_abs_diff_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0, epsilon = EPS);
}

#[test]
fn test_cosine_zero_vector() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
}

#[test]
fn test_euclidean_basic() {
    assert_abs_diff_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0, epsilon = EPS);
    assert_abs_diff_eq!(euclidean_similarity(&[0.0, 0.0], &[3.0, 4.0]), 1.0 / 6.0, epsilon = EPS);
    assert_eq!(euclidean_similarity(&[1.5, -2.0], &[1.5, -2.0]), 1.0);
}

#[test]
fn test_method_parsing() {
    assert_eq!(SimilarityMethod::from_str("cosine").unwrap(), SimilarityMethod::Cosine);
    assert_eq!(
        SimilarityMethod::from_str("euclidean").unwrap(),
        SimilarityMethod::Euclidean
    );
    match SimilarityMethod::from_str("manhattan") {
        Err(RecommendError::InvalidMethod { method, .. }) => assert_eq!(method, "manhattan"),
        other => panic!("expected InvalidMethod, got {:?}", other),
    }
    // names are case sensitive
    assert!(SimilarityMethod::from_str("Cosine").is_err());
}

#[test]
fn test_matrix_symmetric_with_unit_diagonal() {
    let tracks = random_tracks(12, 21);
    let batch = normalise_tracks(&tracks);

    for method in [SimilarityMethod::Cosine, SimilarityMethod::Euclidean] {
        let m = similarity_matrix(&batch.rows, method);
        assert_eq!(m.len(), 12);
        for i in 0..12 {
            assert_eq!(m[i].len(), 12);
            assert_abs_diff_eq!(m[i][i], 1.0, epsilon = 1e-9);
            for j in 0..12 {
                assert_eq!(m[i][j], m[j][i], "{} not symmetric at ({}, {})", method, i, j);
            }
        }
    }
}

#[test]
fn test_euclidean_matrix_bounded() {
    let tracks = random_tracks(8, 2);
    let batch = normalise_tracks(&tracks);
    let m = similarity_matrix(&batch.rows, SimilarityMethod::Euclidean);
    assert!(m.iter().flatten().all(|&s| s > 0.0 && s <= 1.0));
}

#[test]
fn test_matrix_needs_two_rows() {
    let one = vec![vec![1.0, 2.0]];
    assert!(similarity_matrix(&one, SimilarityMethod::Cosine).is_empty());
    let none: Vec<Vec<f64>> = Vec::new();
    assert!(similarity_matrix(&none, SimilarityMethod::Euclidean).is_empty());
}
