//! Removal of low-variance features.

use crate::error::Result;
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Target, Value};
use crate::stats::{Univariate, Variance};
use std::collections::BTreeMap;

/// Drops features whose running variance is at or below a threshold.
///
/// Features seen fewer than `min_samples` times are always kept, so the
/// selector answers `transform` before any update.
///
/// # Example
/// ```
/// use streamlearn::estimator::Estimator;
/// use streamlearn::feature_selection::VarianceThreshold;
/// use streamlearn::observation::Observation;
///
/// let mut selector = VarianceThreshold::new();
/// for v in [1.0, 2.0, 3.0] {
///     let x = Observation::from_numeric([("constant", 0.0), ("varying", v)]);
///     selector.update(&x, None).unwrap();
/// }
/// let out = selector
///     .transform(&Observation::from_numeric([("constant", 0.0), ("varying", 4.0)]))
///     .unwrap();
/// assert!(out.contains("varying"));
/// assert!(!out.contains("constant"));
/// ```
#[derive(Clone, Debug)]
pub struct VarianceThreshold {
    threshold: f64,
    min_samples: u64,
    variances: BTreeMap<String, Variance>,
}

impl Default for VarianceThreshold {
    fn default() -> Self {
        Self::new()
    }
}

impl VarianceThreshold {
    pub fn new() -> Self {
        Self {
            threshold: 0.0,
            min_samples: 2,
            variances: BTreeMap::new(),
        }
    }

    /// Keep features whose variance is strictly above `threshold`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Minimum number of values before a feature can be dropped.
    pub fn with_min_samples(mut self, min_samples: u64) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Running sample variance of a feature.
    pub fn variance(&self, feature: &str) -> Option<f64> {
        self.variances.get(feature).map(|v| v.get())
    }

    fn keeps(&self, feature: &str) -> bool {
        match self.variances.get(feature) {
            Some(var) => var.count() < self.min_samples as f64 || var.get() > self.threshold,
            None => true,
        }
    }
}

impl Estimator for VarianceThreshold {
    fn name(&self) -> String {
        "VarianceThreshold".to_string()
    }

    fn role(&self) -> Role {
        Role::FeatureSelector
    }

    fn update(&mut self, x: &Observation, _y: Option<&Target>) -> Result<()> {
        for (name, value) in x.numeric_features()? {
            self.variances
                .entry(name.to_string())
                .or_insert_with(|| Variance::new(1))
                .update(value);
        }
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        Ok(x.numeric_features()?
            .into_iter()
            .filter(|(name, _)| self.keeps(name))
            .map(|(name, value)| (name.to_string(), Value::Numeric(value)))
            .collect())
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance_threshold_keeps_everything_initially() {
        let selector = VarianceThreshold::new();
        let x = Observation::from_numeric([("a", 1.0), ("b", 2.0)]);
        assert_eq!(selector.transform(&x).unwrap(), x);
    }

    #[test]
    fn test_variance_threshold_custom_threshold() {
        let mut selector = VarianceThreshold::new().with_threshold(1.0);
        for v in [0.0, 1.0, 2.0] {
            // a has variance 1.0, b has variance 4.0
            let x = Observation::from_numeric([("a", v), ("b", 2.0 * v)]);
            selector.update(&x, None).unwrap();
        }
        assert_eq!(selector.variance("a"), Some(1.0));
        let out = selector
            .transform(&Observation::from_numeric([("a", 0.0), ("b", 0.0)]))
            .unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_variance_threshold_min_samples() {
        let mut selector = VarianceThreshold::new().with_min_samples(3);
        for _ in 0..2 {
            selector
                .update(&Observation::from_numeric([("c", 5.0)]), None)
                .unwrap();
        }
        assert!(selector
            .transform(&Observation::from_numeric([("c", 5.0)]))
            .unwrap()
            .contains("c"));
    }

    #[test]
    fn test_variance_threshold_role() {
        assert_eq!(VarianceThreshold::new().role(), Role::FeatureSelector);
    }
}
