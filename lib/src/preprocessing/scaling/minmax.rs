//! Min-Max Scaler.
//!
//! Scales each feature to a given range (default [0, 1]) using the running
//! minimum and maximum of that feature:
//! ```text
//! X_scaled = (X - X_min) / (X_max - X_min) * (max - min) + min
//! ```

use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Target, Value};
use crate::stats::{Max, Min, Univariate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerConfig {
    /// Minimum value of the target range.
    pub min: f64,
    /// Maximum value of the target range.
    pub max: f64,
}

impl Default for MinMaxScalerConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Incremental MinMaxScaler.
#[derive(Clone, Debug, Default)]
pub struct MinMaxScaler {
    config: MinMaxScalerConfig,
    extrema: BTreeMap<String, (Min, Max)>,
}

impl MinMaxScaler {
    /// Create a new MinMaxScaler scaling to [0, 1].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target range.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] if `min >= max`.
    pub fn with_range(mut self, min: f64, max: f64) -> Result<Self> {
        if min >= max {
            return Err(EstimatorError::InvalidParameter(format!(
                "MinMaxScaler range must satisfy min < max, got [{}, {}]",
                min, max
            )));
        }
        self.config = MinMaxScalerConfig { min, max };
        Ok(self)
    }

    /// Running (min, max) of a feature.
    pub fn range_of(&self, feature: &str) -> Option<(f64, f64)> {
        self.extrema
            .get(feature)
            .map(|(min, max)| (min.get(), max.get()))
    }
}

impl Estimator for MinMaxScaler {
    fn name(&self) -> String {
        "MinMaxScaler".to_string()
    }

    fn role(&self) -> Role {
        Role::Transformer
    }

    fn update(&mut self, x: &Observation, _y: Option<&Target>) -> Result<()> {
        for (name, value) in x.numeric_features()? {
            let (min, max) = self.extrema.entry(name.to_string()).or_default();
            min.update(value);
            max.update(value);
        }
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        if self.extrema.is_empty() {
            return Err(EstimatorError::NotFitted {
                estimator: self.name(),
            });
        }

        let span = self.config.max - self.config.min;
        let mut out = Observation::new();
        for (name, value) in x.numeric_features()? {
            let scaled = match self.extrema.get(name) {
                Some((min, max)) => {
                    let range = max.get() - min.get();
                    let unit = if range > 0.0 {
                        (value - min.get()) / range
                    } else {
                        0.0
                    };
                    unit * span + self.config.min
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

    fn obs(v: f64) -> Observation {
        Observation::from_numeric([("x", v)])
    }

    #[test]
    fn test_minmax_scaler_unit_range() {
        let mut scaler = MinMaxScaler::new();
        for v in [2.0, 4.0, 6.0] {
            scaler.update(&obs(v), None).unwrap();
        }
        assert_eq!(scaler.range_of("x"), Some((2.0, 6.0)));

        let out = scaler.transform(&obs(5.0)).unwrap();
        assert!((out.get("x").unwrap().as_f64().unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_scaler_custom_range() {
        let mut scaler = MinMaxScaler::new().with_range(-1.0, 1.0).unwrap();
        scaler.update(&obs(0.0), None).unwrap();
        scaler.update(&obs(10.0), None).unwrap();
        let out = scaler.transform(&obs(10.0)).unwrap();
        assert_eq!(out.get("x").unwrap().as_f64(), Some(1.0));
    }

    #[test]
    fn test_minmax_scaler_invalid_range() {
        assert!(matches!(
            MinMaxScaler::new().with_range(1.0, 1.0),
            Err(EstimatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_minmax_scaler_constant_feature() {
        let mut scaler = MinMaxScaler::new();
        scaler.update(&obs(3.0), None).unwrap();
        let out = scaler.transform(&obs(3.0)).unwrap();
        assert_eq!(out.get("x").unwrap().as_f64(), Some(0.0));
    }

    #[test]
    fn test_minmax_scaler_not_fitted() {
        assert!(MinMaxScaler::new()
            .transform(&obs(1.0))
            .unwrap_err()
            .is_not_fitted());
    }
}
