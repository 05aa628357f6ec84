use criterion::{criterion_group, criterion_main, Criterion};
use hashchain_core::merkle_root;
use hashchain_core::pow::{find_proof, find_proof_parallel};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    c.bench_function("find_proof_difficulty_4", |b| {
        b.iter(|| find_proof(1, 4));
    });
    c.bench_function("find_proof_parallel_difficulty_4", |b| {
        b.iter(|| find_proof_parallel(1, 4));
    });
}

fn bench_merkle(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let txs: Vec<String> = (0..1000)
        .map(|i| format!("alice-{i}->bob:{}", rng.gen_range(1..10)))
        .collect();
    c.bench_function("merkle_root_1000_txs", |b| {
        b.iter(|| merkle_root(&txs));
    });
}

criterion_group!(benches, bench_pow, bench_merkle);
criterion_main!(benches);
