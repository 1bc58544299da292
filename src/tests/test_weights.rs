use std::sync::Arc;
use std::thread;

use crate::error::RecommendError;
use crate::features::NumericFeature;
use crate::weights::{SharedWeights, WeightTable, DEFAULT_WEIGHTS};

#[test]
fn test_default_table() {
    let w = WeightTable::default();
    assert_eq!(w.weight(NumericFeature::Danceability), 1.2);
    assert_eq!(w.weight(NumericFeature::Energy), 1.1);
    assert_eq!(w.weight(NumericFeature::Valence), 1.3);
    assert_eq!(w.weight(NumericFeature::Tempo), 0.8);
    assert_eq!(w.weight(NumericFeature::Loudness), 0.6);
    assert_eq!(w.weight(NumericFeature::Acousticness), 1.0);
    assert_eq!(w.weight(NumericFeature::Instrumentalness), 0.9);
    assert_eq!(w.weight(NumericFeature::Liveness), 0.7);
    assert_eq!(w.weight(NumericFeature::Speechiness), 0.8);
    assert!((w.total() - 8.4).abs() < 1e-12);
}

#[test]
fn test_rejects_non_positive_or_non_finite() {
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut weights = DEFAULT_WEIGHTS;
        weights[NumericFeature::Liveness.index()] = bad;
        assert!(matches!(
            WeightTable::new(weights),
            Err(RecommendError::InvalidWeight(_))
        ));
    }
}

#[test]
fn test_from_pairs_requires_every_dimension_once() {
    let full: Vec<(NumericFeature, f64)> = NumericFeature::ALL.iter().map(|&f| (f, 1.0)).collect();
    let table = WeightTable::from_pairs(full.clone()).unwrap();
    assert_eq!(table.total(), 9.0);

    let missing = full[1..].to_vec();
    assert!(WeightTable::from_pairs(missing).is_err());

    let mut duplicated = full.clone();
    duplicated.push((NumericFeature::Energy, 2.0));
    assert!(WeightTable::from_pairs(duplicated).is_err());
}

#[test]
fn test_serde_map_form() {
    let table = WeightTable::default();
    let json = serde_json::to_string(&table).unwrap();
    assert!(json.contains("\"valence\":1.3"));

    let back: WeightTable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);

    let incomplete = r#"{"valence": 1.0}"#;
    assert!(serde_json::from_str::<WeightTable>(incomplete).is_err());

    let negative = json.replace("\"tempo\":0.8", "\"tempo\":-0.8");
    assert!(serde_json::from_str::<WeightTable>(&negative).is_err());
}

#[test]
fn test_replace_is_shared_by_clones() {
    let shared = SharedWeights::default();
    let clone = shared.clone();
    let before = clone.snapshot();

    let uniform = WeightTable::new([1.0; 9]).unwrap();
    let previous = shared.replace(uniform);

    assert_eq!(*previous, WeightTable::default());
    assert_eq!(*clone.snapshot(), uniform);
    // snapshots taken earlier keep the old table
    assert_eq!(*before, WeightTable::default());
}

#[test]
fn test_readers_never_see_partial_table() {
    let a = WeightTable::new([1.0; 9]).unwrap();
    let b = WeightTable::new([2.0; 9]).unwrap();
    let shared = SharedWeights::new(a);

    thread::scope(|s| {
        let writer = shared.clone();
        s.spawn(move || {
            for i in 0..500 {
                writer.replace(if i % 2 == 0 { a } else { b });
            }
        });

        for _ in 0..4 {
            let reader = shared.clone();
            s.spawn(move || {
                for _ in 0..500 {
                    let snap: Arc<WeightTable> = reader.snapshot();
                    let first = snap.as_array()[0];
                    assert!(snap.as_array().iter().all(|&w| w == first));
                }
            });
        }
    });
}
