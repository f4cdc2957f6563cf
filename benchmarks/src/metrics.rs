use streamlearn::dataset::SyntheticStream;
use streamlearn::{Estimator, Prediction, Result, Target};

/// Progressive validation scores.
///
/// Each observation is first predicted, then learned, so every prediction
/// is made on data the model has not seen yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressiveMetrics {
    /// Observations scored (predictions that failed with `NotFitted` are skipped).
    pub n_scored: usize,
    sum_abs: f64,
    sum_sq: f64,
    n_correct: usize,
}

impl ProgressiveMetrics {
    /// Run progressive validation of `estimator` over `stream`.
    ///
    /// Unfitted predictions are skipped; any other error stops the run.
    pub fn evaluate(estimator: &mut dyn Estimator, stream: &SyntheticStream) -> Result<Self> {
        let mut metrics = Self::default();
        for (x, y) in stream.iter() {
            match estimator.predict(x) {
                Ok(prediction) => {
                    if let Some(target) = y {
                        metrics.record(&prediction, target);
                    }
                }
                Err(e) if e.is_not_fitted() => {}
                Err(e) => return Err(e),
            }
            estimator.update(x, y)?;
        }
        Ok(metrics)
    }

    /// Score one prediction against its target.
    pub fn record(&mut self, prediction: &Prediction, target: &Target) {
        match (prediction, target) {
            (Prediction::Label(predicted), Target::Label(actual)) => {
                if predicted == actual {
                    self.n_correct += 1;
                }
            }
            (prediction, target) => {
                let diff = prediction.as_f64() - target.as_f64();
                self.sum_abs += diff.abs();
                self.sum_sq += diff * diff;
            }
        }
        self.n_scored += 1;
    }

    /// Mean absolute error.
    pub fn mae(&self) -> f64 {
        self.mean(self.sum_abs)
    }

    /// Mean squared error.
    pub fn mse(&self) -> f64 {
        self.mean(self.sum_sq)
    }

    /// Root mean squared error, in the units of the target.
    pub fn rmse(&self) -> f64 {
        self.mse().sqrt()
    }

    /// Share of correctly predicted labels.
    pub fn accuracy(&self) -> f64 {
        self.mean(self.n_correct as f64)
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.n_scored == 0 {
            0.0
        } else {
            sum / self.n_scored as f64
        }
    }
}
