use crate::features::{FeatureVector, NumericFeature, Track};
use crate::filter::{filter_by_feature_ranges, first_violation, within_tolerance};
use crate::tests::test_data::{random_tracks, reference_target};

fn key_track(id: &str, valence: f64, energy: f64, danceability: f64) -> Track {
    Track::new(
        id,
        FeatureVector::default()
            .with(NumericFeature::Valence, valence)
            .with(NumericFeature::Energy, energy)
            .with(NumericFeature::Danceability, danceability),
    )
}

#[test]
fn test_zero_tolerance_keeps_identical_key_features() {
    let target = reference_target();
    // only the key dimensions have to match
    let twin = Track::new(
        "twin",
        target
            .features
            .with(NumericFeature::Tempo, 60.0)
            .with(NumericFeature::Acousticness, 0.9),
    );
    let kept = filter_by_feature_ranges(&target, &[twin], 0.0);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "twin");
}

#[test]
fn test_any_key_violation_excludes() {
    let target = key_track("t", 0.5, 0.5, 0.5);
    let cands = vec![
        key_track("ok", 0.6, 0.4, 0.55),
        key_track("valence", 0.9, 0.5, 0.5),
        key_track("energy", 0.5, 0.05, 0.5),
        key_track("dance", 0.5, 0.5, 1.0),
    ];
    let kept = filter_by_feature_ranges(&target, &cands, 0.3);
    let ids: Vec<&str> = kept.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);
}

#[test]
fn test_boundary_is_inclusive() {
    let target = key_track("t", 0.5, 0.5, 0.5);
    let edge = key_track("edge", 0.25, 0.75, 0.5);
    assert!(within_tolerance(&target.features, &edge.features, 0.25));
}

#[test]
fn test_first_violation_checks_valence_first() {
    let target = key_track("t", 0.0, 0.0, 0.0);
    let far = key_track("far", 1.0, 1.0, 1.0);
    let (feature, diff) = first_violation(&target.features, &far.features, 0.3).unwrap();
    assert_eq!(feature, NumericFeature::Valence);
    assert_eq!(diff, 1.0);

    let energy_only = key_track("e", 0.0, 0.5, 0.9);
    let (feature, _) = first_violation(&target.features, &energy_only.features, 0.3).unwrap();
    assert_eq!(feature, NumericFeature::Energy);
}

#[test]
fn test_missing_key_value_counts_as_zero() {
    let target = Track::new("t", FeatureVector::default());
    let low = key_track("low", 0.1, 0.2, 0.0);
    let high = key_track("high", 0.1, 0.2, 0.8);
    let kept = filter_by_feature_ranges(&target, &[low, high], 0.3);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "low");
}

#[test]
fn test_preserves_order_and_records() {
    let target = key_track("t", 0.5, 0.5, 0.5);
    let cands = random_tracks(40, 17);
    let kept = filter_by_feature_ranges(&target, &cands, 1.0);
    assert_eq!(kept, cands);

    let kept = filter_by_feature_ranges(&target, &cands, 0.3);
    let positions: Vec<usize> = kept
        .iter()
        .map(|k| cands.iter().position(|c| c.id == k.id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(kept.len() < cands.len());
}

#[test]
fn test_empty_candidates() {
    let target = reference_target();
    assert!(filter_by_feature_ranges(&target, &[], 0.3).is_empty());
}
