//! Run every built-in estimator through the native checker and print the
//! report as JSON.
//!
//! An optional argument names a JSON file with `CheckConfig` overrides.
//! The process exits with status 1 when any estimator fails.

use std::process::ExitCode;

use benchmarks::{time_updates, ProgressiveMetrics};
use serde_json::json;
use streamlearn::check::{check_suite, CheckConfig};
use streamlearn::cluster::KMeans;
use streamlearn::compose::{parallel, sequential};
use streamlearn::dataset::{StreamKind, SyntheticStream};
use streamlearn::feature_selection::{SelectKBest, VarianceThreshold};
use streamlearn::model::{
    GaussianNB, LinearRegression, LogisticRegression, OneVsRestClassifier, PAClassifier,
};
use streamlearn::preprocessing::{MinMaxScaler, OneHotEncoder, PolynomialExtender, StandardScaler};
use streamlearn::stats::PearsonCorrelation;
use streamlearn::{factory, Estimator, EstimatorError, EstimatorFactory};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn factories() -> Vec<EstimatorFactory> {
    vec![
        factory(StandardScaler::new()),
        factory(MinMaxScaler::new()),
        factory(OneHotEncoder::new()),
        factory(PolynomialExtender::new()),
        factory(VarianceThreshold::new()),
        factory(SelectKBest::new(PearsonCorrelation::new(), 2)),
        factory(LinearRegression::new()),
        factory(LogisticRegression::new()),
        factory(PAClassifier::new()),
        factory(GaussianNB::new()),
        factory(KMeans::new(5).with_random_state(42)),
        factory(
            sequential(StandardScaler::new(), LogisticRegression::new())
                .expect("scaler feeds a classifier"),
        ),
        factory(
            parallel(MinMaxScaler::new(), StandardScaler::new())
                .expect("two distinct transformers"),
        ),
        factory(OneVsRestClassifier::new(PAClassifier::new()).expect("binary template")),
    ]
}

fn load_config() -> Result<CheckConfig, EstimatorError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| EstimatorError::Config(format!("cannot read {}: {}", path, e)))?;
            CheckConfig::from_json(&text)
        }
        None => Ok(CheckConfig::default()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!(%e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(seed = config.seed, n_samples = config.n_samples, "running conformance suite");

    let report = check_suite(&factories(), &config);

    // Progressive validation scores for the supervised models
    let mut scores = Vec::new();
    for make in factories() {
        let mut estimator = make();
        let role = estimator.role();
        if !role.is_supervised() {
            continue;
        }
        let stream = SyntheticStream::generate(
            StreamKind::for_role(role, config.n_classes),
            config.n_samples,
            config.n_features,
            config.seed,
        );
        let latency = time_updates(estimator.box_clone().as_mut(), &stream);
        match (ProgressiveMetrics::evaluate(estimator.as_mut(), &stream), latency) {
            (Ok(metrics), Ok(latency)) => scores.push(json!({
                "estimator": estimator.name(),
                "scored": metrics.n_scored,
                "mae": metrics.mae(),
                "accuracy": metrics.accuracy(),
                "mean_update_us": latency.map(|s| s.mean_us),
            })),
            (Err(e), _) | (_, Err(e)) => {
                error!(estimator = %estimator.name(), %e, "progressive validation failed")
            }
        }
    }

    let output = json!({
        "config": config,
        "report": report,
        "progressive_validation": scores,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            error!(%e, "cannot serialize report");
            return ExitCode::FAILURE;
        }
    }

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        for failure in report.failures() {
            error!(%failure, "estimator failed");
        }
        ExitCode::FAILURE
    }
}
