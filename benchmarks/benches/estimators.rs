use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use streamlearn::cluster::KMeans;
use streamlearn::dataset::{StreamKind, SyntheticStream};
use streamlearn::model::{GaussianNB, LinearRegression, LogisticRegression, PAClassifier};
use streamlearn::preprocessing::StandardScaler;
use streamlearn::{factory, Estimator, EstimatorFactory};

const N_SAMPLES: usize = 1_000;

fn cases() -> Vec<(&'static str, EstimatorFactory)> {
    vec![
        ("StandardScaler", factory(StandardScaler::new())),
        ("LinearRegression", factory(LinearRegression::new())),
        ("LogisticRegression", factory(LogisticRegression::new())),
        ("PAClassifier", factory(PAClassifier::new())),
        ("GaussianNB", factory(GaussianNB::new())),
        ("KMeans", factory(KMeans::new(5).with_random_state(42))),
    ]
}

fn stream_for(estimator: &dyn Estimator, n_features: usize) -> SyntheticStream {
    SyntheticStream::generate(
        StreamKind::for_role(estimator.role(), 3),
        N_SAMPLES,
        n_features,
        42,
    )
}

/// Learn a whole stream, one update per observation.
fn bench_update_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_stream");
    for (name, make) in cases() {
        for n_features in [2, 8, 32] {
            let stream = stream_for(make().as_ref(), n_features);
            group.bench_with_input(BenchmarkId::new(name, n_features), &stream, |b, stream| {
                b.iter(|| {
                    let mut estimator = make();
                    for (x, y) in stream.iter() {
                        estimator
                            .update(black_box(x), black_box(y))
                            .expect("synthetic stream matches the role");
                    }
                    black_box(estimator);
                });
            });
        }
    }
    group.finish();
}

/// Output latency of a model that has seen the whole stream.
fn bench_predict_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_single");
    for (name, make) in cases() {
        let mut estimator = make();
        let stream = stream_for(estimator.as_ref(), 8);
        for (x, y) in stream.iter() {
            estimator.update(x, y).expect("synthetic stream matches the role");
        }
        let (x, _) = stream.iter().next().expect("non-empty stream");

        group.bench_function(name, |b| {
            b.iter(|| {
                let out = if estimator.role().is_predictor() {
                    estimator.predict(black_box(x)).map(|_| ())
                } else {
                    estimator.transform(black_box(x)).map(|_| ())
                };
                black_box(out)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_update_stream, bench_predict_single);
criterion_main!(benches);
