use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use credit_fairness::fairness::{
    FairnessConfig, FairnessEvaluator, IndividualFairnessConfig, IndividualFairnessEvaluator,
};
use ndarray::Array1;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_credit_data(n_rows: usize) -> (DataFrame, Array1<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let status: Vec<&str> = (0..n_rows)
        .map(|_| if rng.gen_bool(0.4) { "female" } else { "male" })
        .collect();
    let age: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(19..75)).collect();
    let amount: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(250.0..18000.0)).collect();
    let duration: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(1..13) * 6).collect();
    let y: Vec<i64> = (0..n_rows).map(|_| rng.gen_bool(0.7) as i64).collect();
    let scores: Array1<f64> = (0..n_rows).map(|_| rng.gen::<f64>()).collect();
    let predictions = scores.mapv(|s| if s >= 0.5 { 1.0 } else { 0.0 });

    let df = df!(
        "PersonalStatus" => &status,
        "Age" => &age,
        "CreditAmount" => &amount,
        "Duration" => &duration,
        "y" => &y,
    )
    .unwrap();

    (df, predictions, scores)
}

fn bench_individual_fairness(c: &mut Criterion) {
    let mut group = c.benchmark_group("individual_fairness");
    group.sample_size(10);

    for n_rows in [250, 500, 1000].iter() {
        let (df, _, scores) = create_credit_data(*n_rows);
        let evaluator = IndividualFairnessEvaluator::new(IndividualFairnessConfig::default().with_seed(1));
        let excluded = vec!["PersonalStatus".to_string(), "Age".to_string()];

        group.bench_with_input(BenchmarkId::new("pairwise", n_rows), &df, |b, df| {
            b.iter(|| evaluator.evaluate(black_box(df), &scores, &excluded).unwrap())
        });
    }

    group.finish();
}

fn bench_full_report(c: &mut Criterion) {
    let (df, predictions, scores) = create_credit_data(5000);
    let evaluator = FairnessEvaluator::new(FairnessConfig::default().with_seed(1));

    c.bench_function("evaluate_dataset_5000", |b| {
        b.iter(|| {
            evaluator
                .evaluate_dataset(black_box(&df), &predictions, &scores)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_individual_fairness, bench_full_report);
criterion_main!(benches);
