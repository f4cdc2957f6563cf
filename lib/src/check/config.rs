//! Configuration of the conformance checkers.

use crate::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of a conformance run.
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides:
///
/// ```
/// use streamlearn::check::CheckConfig;
///
/// let config = CheckConfig::from_json(r#"{ "n_samples": 20 }"#).unwrap();
/// assert_eq!(config.n_samples, 20);
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Seed of the synthetic stream.
    pub seed: u64,
    /// Number of observations in the stream.
    pub n_samples: usize,
    /// Number of numeric features per observation.
    pub n_features: usize,
    /// Number of classes in multiclass streams.
    pub n_classes: usize,
    /// Largest absolute value a transformer may output on the stream once
    /// it has seen all of it.
    pub transform_bound: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_samples: 50,
            n_features: 4,
            n_classes: 3,
            transform_bound: 1e3,
        }
    }
}

impl CheckConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    pub fn with_n_features(mut self, n_features: usize) -> Self {
        self.n_features = n_features;
        self
    }

    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    pub fn with_transform_bound(mut self, transform_bound: f64) -> Self {
        self.transform_bound = transform_bound;
        self
    }

    /// Reject configurations that cannot produce a meaningful stream.
    ///
    /// # Errors
    /// Returns [`EstimatorError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.n_samples == 0 {
            return Err(EstimatorError::Config(
                "n_samples must be at least 1".to_string(),
            ));
        }
        if self.n_features == 0 {
            return Err(EstimatorError::Config(
                "n_features must be at least 1".to_string(),
            ));
        }
        if self.n_classes < 2 {
            return Err(EstimatorError::Config(format!(
                "n_classes must be at least 2, got {}",
                self.n_classes
            )));
        }
        if !(self.transform_bound > 0.0 && self.transform_bound.is_finite()) {
            return Err(EstimatorError::Config(format!(
                "transform_bound must be positive and finite, got {}",
                self.transform_bound
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CheckConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.n_samples, 50);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_builder_methods() {
        let config = CheckConfig::default()
            .with_seed(7)
            .with_n_samples(10)
            .with_n_features(2)
            .with_n_classes(4)
            .with_transform_bound(10.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_features, 2);
        assert_eq!(config.n_classes, 4);
        assert_eq!(config.transform_bound, 10.0);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            CheckConfig::default().with_n_samples(0).validate(),
            Err(EstimatorError::Config(_))
        ));
        assert!(CheckConfig::default().with_n_classes(1).validate().is_err());
        assert!(CheckConfig::default()
            .with_transform_bound(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_json_rejects_malformed_and_invalid() {
        assert!(matches!(
            CheckConfig::from_json("{ not json"),
            Err(EstimatorError::Config(_))
        ));
        assert!(matches!(
            CheckConfig::from_json(r#"{ "n_features": 0 }"#),
            Err(EstimatorError::Config(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = CheckConfig::default().with_seed(3);
        let parsed = CheckConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
