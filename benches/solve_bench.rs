use cfmm_arb::{ArbitrageRouter, Pool, build_arbitrage_program};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn five_pools() -> Vec<Pool> {
    vec![
        Pool::weighted(vec![0, 1, 2, 3], vec![4.0, 4.0, 4.0, 4.0], vec![4.0, 3.0, 2.0, 1.0], 0.998).unwrap(),
        Pool::constant_product(vec![0, 1], vec![10.0, 1.0], 0.997).unwrap(),
        Pool::constant_product(vec![1, 2], vec![1.0, 5.0], 0.997).unwrap(),
        Pool::constant_product(vec![2, 3], vec![40.0, 50.0], 0.997).unwrap(),
        Pool::constant_sum(vec![2, 3], vec![10.0, 10.0], 0.999).unwrap(),
    ]
}

fn benchmark_arbitrage(c: &mut Criterion) {
    let pools = five_pools();
    let market_value = [1.5, 10.0, 2.0, 3.0];
    let router = ArbitrageRouter::default();

    c.bench_function("build_arbitrage_program", |b| {
        b.iter(|| build_arbitrage_program(black_box(4), black_box(&pools), black_box(&market_value)).unwrap())
    });

    c.bench_function("optimize_arbitrage", |b| {
        b.iter(|| router.optimize_arbitrage(black_box(4), black_box(&pools), black_box(&market_value)).unwrap())
    });
}

criterion_group!(benches, benchmark_arbitrage);
criterion_main!(benches);
