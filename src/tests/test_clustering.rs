//! Tests for the k-means wrapper and its fallbacks.

use crate::clustering::{cluster_tracks, kmeans_lloyd, ClusterParams};
use crate::features::{FeatureVector, Track};
use crate::tests::test_data::{random_tracks, two_groups};

#[test]
fn test_kmeans_lloyd_simple_clusters() {
    let rows = vec![
        vec![0.0, 0.0],
        vec![0.1, 0.1],
        vec![0.0, 0.1],
        vec![10.0, 10.0],
        vec![10.1, 10.1],
        vec![10.0, 10.1],
    ];

    let assignments = kmeans_lloyd(&rows, 2, 50, 128).unwrap();

    let label0 = assignments[0];
    assert_eq!(assignments[1], label0);
    assert_eq!(assignments[2], label0);

    let label1 = assignments[3];
    assert_ne!(label0, label1);
    assert_eq!(assignments[4], label1);
    assert_eq!(assignments[5], label1);
}

#[test]
fn test_kmeans_lloyd_rejects_degenerate_input() {
    assert!(kmeans_lloyd(&[], 3, 10, 42).unwrap().is_empty());
    assert!(kmeans_lloyd(&[vec![1.0], vec![2.0]], 1, 10, 42).is_err());
    assert!(kmeans_lloyd(&[vec![1.0, 2.0], vec![2.0]], 2, 10, 42).is_err());
}

#[test]
fn test_more_clusters_than_tracks_gives_zeros() {
    let tracks = random_tracks(3, 1);
    let labels = cluster_tracks(&tracks, 5, &ClusterParams::default());
    assert_eq!(labels, vec![0, 0, 0]);
}

#[test]
fn test_empty_batch() {
    assert!(cluster_tracks(&[], 3, &ClusterParams::default()).is_empty());
}

#[test]
fn test_single_cluster_request_falls_back_to_zeros() {
    let tracks = random_tracks(6, 2);
    assert_eq!(cluster_tracks(&tracks, 1, &ClusterParams::default()), vec![0; 6]);
}

#[test]
fn test_separated_groups() {
    let tracks = two_groups(5);
    let labels = cluster_tracks(&tracks, 2, &ClusterParams::default());
    assert_eq!(labels.len(), 10);

    let first = labels[0];
    let second = labels[5];
    assert_ne!(first, second);
    assert!(labels[..5].iter().all(|&l| l == first));
    assert!(labels[5..].iter().all(|&l| l == second));
}

#[test]
fn test_labels_in_range_and_deterministic() {
    let tracks = random_tracks(40, 99);
    let params = ClusterParams::default();

    let a = cluster_tracks(&tracks, 4, &params);
    let b = cluster_tracks(&tracks, 4, &params);
    assert_eq!(a.len(), 40);
    assert!(a.iter().all(|&l| l < 4));
    assert_eq!(a, b);
}

#[test]
fn test_identical_tracks_still_label_everything() {
    let tracks: Vec<Track> = (0..6)
        .map(|i| Track::new(format!("same{}", i), FeatureVector::from_values([0.5; 9])))
        .collect();
    let labels = cluster_tracks(&tracks, 2, &ClusterParams::default());
    assert_eq!(labels.len(), 6);
    assert!(labels.iter().all(|&l| l < 2));
}
