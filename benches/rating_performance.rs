//! Performance benchmarks for rating calculations and match recording

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use movie_elo::pairing::PairingPolicy;
use movie_elo::rating::{EloRatingCalculator, InMemoryRatingStore, RatingCalculator};
use movie_elo::service::RankingService;
use movie_elo::types::MatchOutcome;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn bench_rating_calculations(c: &mut Criterion) {
    let calculator = EloRatingCalculator::default();

    c.bench_function("elo_update_decisive", |b| {
        b.iter(|| {
            black_box(calculator.calculate(
                black_box(1600),
                black_box(1400),
                MatchOutcome::AWins,
            ))
        })
    });

    c.bench_function("elo_update_draw", |b| {
        b.iter(|| {
            black_box(calculator.calculate(
                black_box(1523),
                black_box(1488),
                MatchOutcome::Draw,
            ))
        })
    });
}

fn bench_pair_selection(c: &mut Criterion) {
    let policy = PairingPolicy::default();
    let candidates: Vec<i64> = (1..=1_000).collect();
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("pick_pair_1000_movies", |b| {
        b.iter(|| black_box(policy.pick_pair(&candidates, Some((10, 20)), &mut rng)))
    });
}

fn bench_record_match(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let store = Arc::new(InMemoryRatingStore::new());
    let service = RankingService::new(store, Arc::new(EloRatingCalculator::default()));
    let (a, b) = rt.block_on(async {
        let a = service.add_item("Alien", None).await.unwrap();
        let b = service.add_item("Brazil", None).await.unwrap();
        (a, b)
    });

    c.bench_function("record_match_in_memory", |bench| {
        bench.iter(|| {
            rt.block_on(async { black_box(service.record_decisive_match(a, b).await.unwrap()) })
        })
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_pair_selection,
    bench_record_match
);
criterion_main!(benches);
