//! Standard Scaler (running Z-score normalization).
//!
//! Transforms features by removing the running mean and scaling to unit
//! running variance:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` and `s` are the mean and population standard deviation of the
//! values seen so far for that feature.
//!
//! # Example
//! ```
//! use streamlearn::estimator::Estimator;
//! use streamlearn::observation::Observation;
//! use streamlearn::preprocessing::StandardScaler;
//!
//! let mut scaler = StandardScaler::new().with_std(true);
//! for v in [1.0, 2.0, 3.0] {
//!     scaler.update(&Observation::from_numeric([("x", v)]), None).unwrap();
//! }
//! let z = scaler.transform(&Observation::from_numeric([("x", 2.0)])).unwrap();
//! assert_eq!(z.get("x").unwrap().as_f64(), Some(0.0));
//! ```

use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Target, Value};
use crate::stats::{Univariate, Variance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Incremental StandardScaler.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
    variances: BTreeMap<String, Variance>,
}

impl StandardScaler {
    /// Create a new StandardScaler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }

    /// Running mean of a feature.
    pub fn mean(&self, feature: &str) -> Option<f64> {
        self.variances.get(feature).map(|v| v.mean())
    }

    /// Running population standard deviation of a feature.
    pub fn std(&self, feature: &str) -> Option<f64> {
        self.variances.get(feature).map(|v| v.get().sqrt())
    }
}

impl Estimator for StandardScaler {
    fn name(&self) -> String {
        "StandardScaler".to_string()
    }

    fn role(&self) -> Role {
        Role::Transformer
    }

    fn update(&mut self, x: &Observation, _y: Option<&Target>) -> Result<()> {
        let features = x.numeric_features()?;
        for (name, value) in features {
            self.variances
                .entry(name.to_string())
                .or_insert_with(|| Variance::new(0))
                .update(value);
        }
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        if self.variances.is_empty() {
            return Err(EstimatorError::NotFitted {
                estimator: self.name(),
            });
        }

        let features = x.numeric_features()?;
        let mut out = Observation::new();
        for (name, value) in features {
            let scaled = match self.variances.get(name) {
                Some(var) => {
                    let mut z = value;
                    if self.config.with_mean {
                        z -= var.mean();
                    }
                    if self.config.with_std {
                        // Constant features keep a unit scale
                        let std = var.get().sqrt();
                        if std > 0.0 {
                            z /= std;
                        }
                    }
                    z
                }
                None => value,
            };
            out.insert(name, Value::Numeric(scaled));
        }
        Ok(out)
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted_scaler() -> StandardScaler {
        // Column a: [0, 0, 1], column b: [1, 1, 3]
        let mut scaler = StandardScaler::new();
        for (a, b) in [(0.0, 1.0), (0.0, 1.0), (1.0, 3.0)] {
            scaler
                .update(&Observation::from_numeric([("a", a), ("b", b)]), None)
                .unwrap();
        }
        scaler
    }

    #[test]
    fn test_standard_scaler_running_mean() {
        let scaler = fitted_scaler();
        assert!((scaler.mean("a").unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((scaler.mean("b").unwrap() - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler_transform() {
        let scaler = fitted_scaler();
        let z = scaler
            .transform(&Observation::from_numeric([("a", 1.0), ("b", 3.0)]))
            .unwrap();
        let expected_a = (1.0 - 1.0 / 3.0) / scaler.std("a").unwrap();
        assert!((z.get("a").unwrap().as_f64().unwrap() - expected_a).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler_not_fitted() {
        let scaler = StandardScaler::new();
        let result = scaler.transform(&Observation::from_numeric([("a", 1.0)]));
        assert!(matches!(result, Err(EstimatorError::NotFitted { .. })));
    }

    #[test]
    fn test_standard_scaler_constant_feature() {
        let mut scaler = StandardScaler::new();
        for _ in 0..3 {
            scaler
                .update(&Observation::from_numeric([("c", 5.0)]), None)
                .unwrap();
        }
        let z = scaler
            .transform(&Observation::from_numeric([("c", 5.0)]))
            .unwrap();
        assert_eq!(z.get("c").unwrap().as_f64(), Some(0.0));
    }

    #[test]
    fn test_standard_scaler_without_mean_and_std() {
        let mut scaler = StandardScaler::new().with_mean(false).with_std(false);
        scaler
            .update(&Observation::from_numeric([("a", 4.0)]), None)
            .unwrap();
        let z = scaler
            .transform(&Observation::from_numeric([("a", 7.0)]))
            .unwrap();
        assert_eq!(z.get("a").unwrap().as_f64(), Some(7.0));
    }

    #[test]
    fn test_standard_scaler_rejects_categorical() {
        let mut scaler = StandardScaler::new();
        let x = Observation::new().with("color", "red");
        assert!(matches!(
            scaler.update(&x, None),
            Err(EstimatorError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_standard_scaler_unseen_feature_passes_through() {
        let scaler = fitted_scaler();
        let z = scaler
            .transform(&Observation::from_numeric([("new", 2.5)]))
            .unwrap();
        assert_eq!(z.get("new").unwrap().as_f64(), Some(2.5));
    }
}
