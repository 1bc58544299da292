use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::prelude::*;
use std::hint::black_box;
use std::time::Duration;

use tunespace::core::{RankingMethod, RecommendRequest, Recommender};
use tunespace::features::{FeatureVector, NumericFeature, Track};

fn random_track(rng: &mut StdRng, id: String) -> Track {
    let fv = NumericFeature::ALL.iter().fold(FeatureVector::default(), |fv, &f| {
        let (lo, hi) = f.range();
        fv.with(f, rng.random_range(lo..hi))
    });
    Track::new(id, fv)
}

fn setup_pool(size: usize, seed: u64) -> (Track, Vec<Track>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let target = random_track(&mut rng, "target".to_string());
    let pool = (0..size)
        .map(|i| random_track(&mut rng, format!("c{i}")))
        .collect();
    (target, pool)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let engine = Recommender::new();

    {
        // sanity: every method returns a full, sorted top-20
        let (target, pool) = setup_pool(50, 1);
        for method in ["cosine", "euclidean", "weighted", "feature_based"] {
            let out = engine
                .rank(&target, &pool, 20, method)
                .expect("known method");
            assert_eq!(out.len(), 20);
            assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    let mut group = c.benchmark_group("rank_top20");
    group.warm_up_time(Duration::from_millis(300));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(40);

    for &size in &[50usize, 500, 5_000] {
        for method in [
            RankingMethod::Cosine,
            RankingMethod::Euclidean,
            RankingMethod::Weighted,
            RankingMethod::FeatureBased,
        ] {
            group.bench_function(BenchmarkId::new(method.as_str(), format!("pool{size}")), |b| {
                b.iter_batched(
                    || setup_pool(size, 42),
                    |(target, pool)| {
                        let out = engine.recommend(&target, &pool, &RecommendRequest::new(method, 20));
                        black_box(out);
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();

    let mut group = c.benchmark_group("analytics");
    group.sample_size(20);
    for &size in &[50usize, 500] {
        group.bench_function(BenchmarkId::new("cluster_k3", format!("batch{size}")), |b| {
            b.iter_batched(
                || setup_pool(size, 7).1,
                |tracks| black_box(engine.cluster_tracks(&tracks, 3)),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(BenchmarkId::new("diversity", format!("batch{size}")), |b| {
            b.iter_batched(
                || setup_pool(size, 7).1,
                |tracks| black_box(engine.diversity_score(&tracks)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
