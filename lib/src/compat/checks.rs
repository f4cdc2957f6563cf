//! Generic checks for the whole-matrix contract.
//!
//! Written only against [`BatchEstimator`], so any implementation can be
//! checked, not just [`BatchAdapter`](crate::compat::BatchAdapter).

use ndarray::{s, Array2};
use tracing::{debug, warn};

use crate::check::{CheckConfig, CheckFailure, Invariant};
use crate::compat::contract::BatchEstimator;
use crate::dataset::{StreamKind, SyntheticStream};
use crate::error::{EstimatorError, Result};
use crate::estimator::Role;
use crate::observation::{Prediction, Target};

/// Output of a batch call.
#[derive(Debug)]
enum BatchOutput {
    Predictions(Vec<Prediction>),
    Matrix(Array2<f64>),
}

fn batch_output<E: BatchEstimator>(estimator: &E, x: &Array2<f64>) -> Result<BatchOutput> {
    if estimator.role().is_predictor() {
        estimator.predict(x).map(BatchOutput::Predictions)
    } else {
        estimator.transform(x).map(BatchOutput::Matrix)
    }
}

impl BatchOutput {
    fn rows(&self) -> usize {
        match self {
            BatchOutput::Predictions(p) => p.len(),
            BatchOutput::Matrix(z) => z.nrows(),
        }
    }

    /// Equality that treats floats by bit pattern.
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (BatchOutput::Predictions(a), BatchOutput::Predictions(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(p, q)| match (p, q) {
                        (Prediction::Real(p), Prediction::Real(q)) => p.to_bits() == q.to_bits(),
                        (p, q) => p == q,
                    })
            }
            (BatchOutput::Matrix(a), BatchOutput::Matrix(b)) => {
                a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(p, q)| p.to_bits() == q.to_bits())
            }
            _ => false,
        }
    }
}

/// Check a [`BatchEstimator`] against the whole-matrix contract.
///
/// `estimator` is cloned for each scenario and never modified. The stream is
/// generated from `config` and matched to the estimator's role.
pub fn check_batch_estimator<E>(estimator: &E, config: &CheckConfig) -> std::result::Result<(), CheckFailure>
where
    E: BatchEstimator + Clone,
{
    let role = estimator.role();
    let name = estimator.name();
    let fail = |invariant: Invariant, reason: String| CheckFailure::new(name.clone(), role, invariant, reason);
    let from_error = |invariant: Invariant, e: &EstimatorError| {
        CheckFailure::from_error(name.clone(), role, invariant, e)
    };

    config.validate().map_err(|e| from_error(Invariant::Configuration, &e))?;
    let stream = SyntheticStream::generate(
        StreamKind::for_role(role, config.n_classes),
        config.n_samples,
        config.n_features,
        config.seed,
    );
    let (x, y) = stream.to_matrix();
    let y = y.as_deref();
    debug!(estimator = %name, %role, rows = x.nrows(), "checking batch estimator");

    let result = (|| {
        // Empty input
        let empty = Array2::<f64>::zeros((0, x.ncols()));
        let empty_y: Option<&[Target]> = y.map(|_| &[][..]);
        match estimator.clone().fit(&empty, empty_y) {
            Err(EstimatorError::EmptyInput) => {}
            Err(e) => return Err(from_error(Invariant::EmptyInputRejected, &e)),
            Ok(_) => {
                return Err(fail(
                    Invariant::EmptyInputRejected,
                    "fit accepted a matrix without rows".to_string(),
                ))
            }
        }

        // Unfitted use
        match batch_output(estimator, &x) {
            Ok(_) => {}
            Err(e) if e.is_not_fitted() => {}
            Err(e) => return Err(from_error(Invariant::UnfittedBehaviour, &e)),
        }

        let mut first = estimator.clone();
        first
            .fit(&x, y)
            .map_err(|e| from_error(Invariant::UpdateSucceeds, &e))?;

        let out = batch_output(&first, &x).map_err(|e| {
            if e.is_not_fitted() {
                from_error(Invariant::FittedAfterUpdate, &e)
            } else {
                from_error(Invariant::OperationFailed, &e)
            }
        })?;
        if out.rows() != x.nrows() {
            return Err(fail(
                Invariant::OutputShape,
                format!("{} rows in, {} rows out", x.nrows(), out.rows()),
            ));
        }
        if let BatchOutput::Matrix(z) = &out {
            if z.iter().any(|v| !v.is_finite()) {
                return Err(fail(Invariant::OutputRange, "transform produced a non-finite value".to_string()));
            }
        }

        let again = batch_output(&first, &x).map_err(|e| from_error(Invariant::OperationFailed, &e))?;
        if !again.same(&out) {
            return Err(fail(Invariant::Determinism, "repeated output differs".to_string()));
        }

        let mut second = first.clone();
        second
            .fit(&x, y)
            .map_err(|e| from_error(Invariant::UpdateSucceeds, &e))?;
        let refit = batch_output(&second, &x).map_err(|e| from_error(Invariant::OperationFailed, &e))?;
        if !refit.same(&out) {
            return Err(fail(
                Invariant::FitIdempotent,
                "fitting twice on the same data changed the output".to_string(),
            ));
        }

        if first.n_features_in() != Some(x.ncols()) {
            return Err(fail(
                Invariant::FeatureCount,
                format!("n_features_in is {:?} after fitting {} columns", first.n_features_in(), x.ncols()),
            ));
        }
        if x.ncols() > 1 {
            let narrow = x.slice(s![.., ..x.ncols() - 1]).to_owned();
            match batch_output(&first, &narrow) {
                Err(EstimatorError::ShapeMismatch { .. }) => {}
                Err(e) => return Err(from_error(Invariant::FeatureCount, &e)),
                Ok(_) => {
                    return Err(fail(
                        Invariant::FeatureCount,
                        "a matrix with fewer columns was accepted".to_string(),
                    ))
                }
            }
        }
        Ok(())
    })();

    if let Err(failure) = &result {
        warn!(estimator = %name, %failure, "batch check failed");
    }
    result
}
