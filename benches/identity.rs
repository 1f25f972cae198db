use criterion::{black_box, criterion_group, criterion_main, Criterion};
use idmetrics_rs::{identity_score_default, Sequence};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Build a synthetic sequence where every identity is active in every frame
/// and overlaps are drawn from a seeded generator.
fn synthetic_sequence(num_ids: usize, timesteps: usize) -> Sequence {
    let mut rng = Pcg64Mcg::seed_from_u64(7);

    let ids = (0..num_ids).collect::<Vec<_>>();
    let gt_ids = vec![ids.clone(); timesteps];
    let tracker_ids = vec![ids.clone(); timesteps];
    let similarity = (0..timesteps)
        .map(|_| Array2::from_shape_fn((num_ids, num_ids), |_| rng.gen_range(0.0..=1.0)))
        .collect::<Vec<_>>();

    Sequence::new(gt_ids, tracker_ids, similarity).unwrap()
}

fn benchmark_identity_score_10_ids(c: &mut Criterion) {
    let sequence = synthetic_sequence(10, 300);

    c.bench_function("identity_score_10_ids", |b| {
        b.iter(|| identity_score_default(black_box(&sequence)).unwrap())
    });
}

fn benchmark_identity_score_50_ids(c: &mut Criterion) {
    let sequence = synthetic_sequence(50, 300);

    c.bench_function("identity_score_50_ids", |b| {
        b.iter(|| identity_score_default(black_box(&sequence)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_identity_score_10_ids,
    benchmark_identity_score_50_ids
);
criterion_main!(benches);
