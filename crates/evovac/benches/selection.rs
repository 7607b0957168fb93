mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use evovac::prelude::{pick_weighted, Rarity, RarityDistanceCurve, RaritySelector, SpawnTable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

fn make_weighted_items(count: usize, zero_ratio: f32, seed: u64) -> Vec<(usize, f32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let unit = |rng: &mut StdRng| (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32;

    (0..count)
        .map(|i| {
            let weight = if unit(&mut rng) < zero_ratio {
                0.0
            } else {
                0.01 + unit(&mut rng) * 0.99
            };
            (i, weight)
        })
        .collect()
}

fn default_table() -> SpawnTable {
    Rarity::ALL
        .iter()
        .zip([0.6, 0.25, 0.1, 0.04, 0.01])
        .fold(SpawnTable::new(), |table, (&rarity, chance)| {
            table.with_tier(rarity, chance)
        })
        .with_default_curves(200.0)
}

fn selection_pick_weighted_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/pick_weighted");

    for &n in &[5usize, 64, 1024, 4096] {
        let items = make_weighted_items(n, 0.25, 0xC0FFEE);
        group.throughput(common::elements_throughput(n));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
            b.iter(|| black_box(pick_weighted(&items, &mut rng)));
        });
    }

    for &n in &[256usize, 2048] {
        let items = make_weighted_items(n, 1.0, 0x0BADF00D);
        group.throughput(common::elements_throughput(n));

        group.bench_with_input(BenchmarkId::new("all_zero", n), &n, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xFEED);
            b.iter(|| black_box(pick_weighted(&items, &mut rng)));
        });
    }

    group.finish();
}

fn selection_rarity_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/rarity");
    let selector = RaritySelector::from_table(&default_table(), Vec3::ZERO);

    for &distance in &[0.0f32, 100.0, 200.0] {
        group.bench_with_input(
            BenchmarkId::new("at_distance", distance as u32),
            &distance,
            |b, &d| {
                let mut rng = StdRng::seed_from_u64(0x12345678);
                b.iter(|| black_box(selector.select_at_distance(d, &mut rng)));
            },
        );
    }

    let flat = SpawnTable::new()
        .with_tier(Rarity::Common, 0.7)
        .with_tier(Rarity::Rare, 0.3)
        .with_curve(RarityDistanceCurve::flat(Rarity::Common, 1.0))
        .with_curve(RarityDistanceCurve::flat(Rarity::Rare, 1.0));
    let flat = RaritySelector::from_table(&flat, Vec3::ZERO);
    group.bench_function("two_tier_flat", |b| {
        let mut rng = StdRng::seed_from_u64(0x87654321);
        b.iter(|| black_box(flat.select(Vec3::new(50.0, 0.0, 50.0), &mut rng)));
    });

    group.bench_function("build_selector", |b| {
        b.iter_batched(
            default_table,
            |table| black_box(RaritySelector::from_table(&table, Vec3::ZERO)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = selection_pick_weighted_benches,
              selection_rarity_benches
}
criterion_main!(benches);
