#[macro_use]
extern crate criterion;
extern crate freqstats;

use criterion::{BatchSize, BenchmarkId, Criterion};
use freqstats::Dataset;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use rand_distr::StandardNormal;

fn normal_values(n: usize) -> Vec<f64> {
    let mut rng = ChaChaRng::from_seed([0; 32]);
    (0..n)
        .map(|_| {
            let x: f64 = rng.sample(StandardNormal);
            (x * 1000.).round() / 1000.
        })
        .collect()
}

fn dataset_insert_single(c: &mut Criterion) {
    c.bench_function("dataset_insert_single", |b| {
        let dataset = Dataset::new();
        dataset.try_extend(normal_values(10_000)).unwrap();

        b.iter(|| {
            dataset.insert(0.5).unwrap();
        })
    });
}

fn dataset_insert_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_insert_many");
    for n in [1_000, 10_000, 100_000] {
        let values = normal_values(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter_batched(
                Dataset::new,
                |dataset| {
                    for x in values {
                        dataset.insert(*x).unwrap();
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn dataset_percentile(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_percentile");
    for (name, dataset) in [("cached", Dataset::new()), ("uncached", Dataset::without_cache())] {
        dataset.try_extend(normal_values(100_000)).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                dataset.percentile(99.99).unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    dataset_insert_single,
    dataset_insert_many,
    dataset_percentile
);
criterion_main!(benches);
