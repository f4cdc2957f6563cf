//! Gaussian Naive Bayes.
//!
//! Keeps, per class, the number of observations and a running mean/variance
//! of every numeric feature. Prediction maximizes
//! ```text
//! log P(c) + Σ_i log N(x_i | mean_ci, var_ci + var_smoothing)
//! ```
//! Probabilities are normalized with log-sum-exp.

use crate::error::{EstimatorError, Result};
use crate::estimator::{require_target, Estimator, Role};
use crate::observation::{Label, Observation, Prediction, Target};
use crate::stats::{Univariate, Variance};
use std::collections::BTreeMap;
use std::f64::consts::PI;

#[derive(Clone, Debug, Default)]
struct ClassStats {
    count: f64,
    features: BTreeMap<String, Variance>,
}

#[derive(Clone, Debug)]
pub struct GaussianNB {
    var_smoothing: f64,
    classes: BTreeMap<Label, ClassStats>,
    total: f64,
}

impl Default for GaussianNB {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNB {
    pub fn new() -> Self {
        Self {
            var_smoothing: 1e-9,
            classes: BTreeMap::new(),
            total: 0.0,
        }
    }

    /// Set the variance added to every per-class feature variance.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] unless `var_smoothing > 0`.
    pub fn with_var_smoothing(mut self, var_smoothing: f64) -> Result<Self> {
        if !(var_smoothing > 0.0) {
            return Err(EstimatorError::InvalidParameter(format!(
                "var_smoothing must be positive, got {}",
                var_smoothing
            )));
        }
        self.var_smoothing = var_smoothing;
        Ok(self)
    }

    /// Labels seen so far, in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &Label> {
        self.classes.keys()
    }

    fn joint_log_likelihood(&self, x: &Observation) -> Result<Vec<(&Label, f64)>> {
        if self.classes.is_empty() {
            return Err(EstimatorError::NotFitted {
                estimator: self.name(),
            });
        }
        let features = x.numeric_features()?;
        Ok(self
            .classes
            .iter()
            .map(|(label, stats)| {
                let prior = (stats.count / self.total).ln();
                let likelihood: f64 = features
                    .iter()
                    .filter_map(|(name, value)| {
                        stats.features.get(*name).map(|var| {
                            let variance = var.get() + self.var_smoothing;
                            let diff = value - var.mean();
                            -0.5 * (2.0 * PI * variance).ln() - diff * diff / (2.0 * variance)
                        })
                    })
                    .sum();
                (label, prior + likelihood)
            })
            .collect())
    }
}

impl Estimator for GaussianNB {
    fn name(&self) -> String {
        "GaussianNB".to_string()
    }

    fn role(&self) -> Role {
        Role::MultiClassClassifier
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let label = require_target(self, y)?.label()?.clone();
        let features = x.numeric_features()?;

        let stats = self.classes.entry(label).or_default();
        stats.count += 1.0;
        for (name, value) in features {
            stats
                .features
                .entry(name.to_string())
                .or_insert_with(|| Variance::new(1))
                .update(value);
        }
        self.total += 1.0;
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        let jll = self.joint_log_likelihood(x)?;
        let mut best: Option<(&Label, f64)> = None;
        for (label, score) in jll {
            // Ties keep the first label in sorted order
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((label, score));
            }
        }
        best.map(|(label, _)| Prediction::Label(label.clone()))
            .ok_or_else(|| EstimatorError::NotFitted {
                estimator: self.name(),
            })
    }

    fn predict_proba(&self, x: &Observation) -> Result<BTreeMap<Label, f64>> {
        let jll = self.joint_log_likelihood(x)?;
        let max = jll
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let norm: f64 = jll.iter().map(|(_, s)| (s - max).exp()).sum();
        Ok(jll
            .into_iter()
            .map(|(label, s)| (label.clone(), (s - max).exp() / norm))
            .collect())
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(x: f64) -> Observation {
        Observation::from_numeric([("x", x)])
    }

    fn class(c: i64) -> Target {
        Target::Label(Label::Class(c))
    }

    fn fitted() -> GaussianNB {
        let mut model = GaussianNB::new();
        for (x, c) in [(-1.1, 0), (-0.9, 0), (-1.0, 0), (0.9, 1), (1.1, 1), (1.0, 1)] {
            model.update(&obs(x), Some(&class(c))).unwrap();
        }
        model
    }

    #[test]
    fn test_gaussian_nb_not_fitted() {
        let model = GaussianNB::new();
        assert!(model.predict(&obs(0.0)).unwrap_err().is_not_fitted());
        assert!(model.predict_proba(&obs(0.0)).unwrap_err().is_not_fitted());
    }

    #[test]
    fn test_gaussian_nb_predicts_nearest_class() {
        let model = fitted();
        assert_eq!(
            model.predict(&obs(-0.8)).unwrap(),
            Prediction::Label(Label::Class(0))
        );
        assert_eq!(
            model.predict(&obs(1.2)).unwrap(),
            Prediction::Label(Label::Class(1))
        );
    }

    #[test]
    fn test_gaussian_nb_proba_normalized() {
        let model = fitted();
        let proba = model.predict_proba(&obs(0.1)).unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba.values().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[&Label::Class(1)] > proba[&Label::Class(0)]);
    }

    #[test]
    fn test_gaussian_nb_single_observation_is_finite() {
        let mut model = GaussianNB::new();
        model.update(&obs(3.0), Some(&class(7))).unwrap();
        let proba = model.predict_proba(&obs(-3.0)).unwrap();
        assert_eq!(proba[&Label::Class(7)], 1.0);
        assert_eq!(
            model.predict(&obs(-3.0)).unwrap(),
            Prediction::Label(Label::Class(7))
        );
    }

    #[test]
    fn test_gaussian_nb_accepts_binary_labels() {
        let mut model = GaussianNB::new();
        model.update(&obs(1.0), Some(&Target::from(true))).unwrap();
        model.update(&obs(-1.0), Some(&Target::from(false))).unwrap();
        assert_eq!(model.classes().count(), 2);
    }

    #[test]
    fn test_gaussian_nb_rejects_real_target() {
        let mut model = GaussianNB::new();
        assert!(matches!(
            model.update(&obs(1.0), Some(&Target::Real(0.5))),
            Err(EstimatorError::TypeMismatch { .. })
        ));
    }
}
