use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kpi_sentinel::anomaly::{self, AnomalyDetector, ForestConfig};
use kpi_sentinel::preprocessing::prepare;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_kpi_data(n_rows: usize, n_features: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let columns: Vec<Column> = (0..n_features)
        .map(|i| {
            let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 10.0).collect();
            Column::new(format!("kpi_{}", i).into(), values)
        })
        .collect();

    DataFrame::new(columns).unwrap()
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");

    for n_rows in [1000, 10000, 100000].iter() {
        let df = create_kpi_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("prepare", n_rows), &df, |b, df| {
            b.iter(|| prepare(black_box(df.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    let x = prepare(create_kpi_data(10000, 10)).unwrap().matrix;
    for n_estimators in [50, 200, 500].iter() {
        let config = ForestConfig::new().with_n_estimators(*n_estimators);

        group.bench_with_input(BenchmarkId::new("fit", n_estimators), &config, |b, config| {
            b.iter(|| anomaly::train(black_box(&x), config).unwrap())
        });
    }

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");

    // Train once
    let train = prepare(create_kpi_data(5000, 10)).unwrap();
    let forest = anomaly::train(&train.matrix, &ForestConfig::new()).unwrap();

    for n_rows in [100, 1000, 10000].iter() {
        let x = train.scaling.transform(&create_kpi_data(*n_rows, 10)).unwrap();

        group.bench_with_input(BenchmarkId::new("predict", n_rows), &x, |b, x| {
            b.iter(|| forest.predict(black_box(x)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prepare, bench_training, bench_scoring);
criterion_main!(benches);
