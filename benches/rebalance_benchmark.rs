use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flow_rebalancer::rebalance::rebalancer::rebalance;
use flow_rebalancer::simulation::generator::{generate_random_rows, GeneratorConfig};
use flow_rebalancer::simulation::market_sample::market_flows_sample;

fn bench_market_sample(c: &mut Criterion) {
    let set = market_flows_sample();

    c.bench_function("rebalance_market_sample", |b| {
        b.iter(|| rebalance(black_box(set.rows())))
    });
}

fn bench_rebalance_1000_rows(c: &mut Criterion) {
    let config = GeneratorConfig {
        row_count: 1_000,
        subcategories_per_category: 200,
        seed: Some(1),
        ..Default::default()
    };
    let set = generate_random_rows(&config);

    c.bench_function("rebalance_1000_rows", |b| {
        b.iter(|| rebalance(black_box(set.rows())))
    });
}

criterion_group!(benches, bench_market_sample, bench_rebalance_1000_rows);
criterion_main!(benches);
