//! Online optimization: losses and the SGD optimizer used by linear models.
//!
//! Training logic (the model's `update`) is decoupled from parameter update
//! logic (the [`Optimizer`]), so any linear model can be paired with any
//! optimizer and any [`Loss`].

pub mod losses;

pub use losses::{Hinge, Log, Loss, Squared};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weights keyed by feature name plus an intercept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: BTreeMap<String, f64>,
    pub intercept: f64,
}

impl LinearParams {
    /// Raw linear output `w . x + b`. Unseen features have weight 0.
    pub fn dot(&self, features: &[(&str, f64)]) -> f64 {
        features
            .iter()
            .map(|(name, value)| self.weights.get(*name).copied().unwrap_or(0.0) * value)
            .sum::<f64>()
            + self.intercept
    }

    /// Gradient of the linear output scaled by `loss_gradient`.
    pub fn gradient(features: &[(&str, f64)], loss_gradient: f64) -> Self {
        Self {
            weights: features
                .iter()
                .map(|(name, value)| (name.to_string(), loss_gradient * value))
                .collect(),
            intercept: loss_gradient,
        }
    }
}

/// Trait for gradient-based optimizers.
///
/// Implementations update `params` in place following
/// ```text
/// params <- params - learning_rate * gradients
/// ```
pub trait Optimizer<P>: Clone + std::fmt::Debug + Send {
    /// Apply one optimization step.
    fn step(&mut self, params: &mut P, gradients: &P);

    /// Current learning rate.
    fn learning_rate(&self) -> f64;
}

/// Stochastic Gradient Descent optimizer.
///
/// ```text
/// θ ← θ - η · ∇L(θ)
/// ```
/// Stateless: no momentum, no adaptive learning rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    /// Create an SGD optimizer with the given learning rate.
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl Optimizer<LinearParams> for SGD {
    fn step(&mut self, params: &mut LinearParams, gradients: &LinearParams) {
        for (name, grad) in &gradients.weights {
            *params.weights.entry(name.clone()).or_insert(0.0) -= self.lr * grad;
        }
        params.intercept -= self.lr * gradients.intercept;
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgd_learning_rate_accessor() {
        assert_eq!(SGD::new(0.001).learning_rate(), 0.001);
        assert_eq!(SGD::default().learning_rate(), 0.01);
    }

    #[test]
    fn test_sgd_step_updates_weights_and_intercept() {
        let mut sgd = SGD::new(0.1);
        let mut params = LinearParams::default();
        params.weights.insert("a".to_string(), 1.0);
        let grads = LinearParams::gradient(&[("a", 2.0), ("b", -1.0)], 0.5);

        sgd.step(&mut params, &grads);

        assert!((params.weights["a"] - 0.9).abs() < 1e-12);
        assert!((params.weights["b"] - 0.05).abs() < 1e-12);
        assert!((params.intercept + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_sgd_zero_gradients_no_change() {
        let mut sgd = SGD::new(0.1);
        let mut params = LinearParams::default();
        params.weights.insert("a".to_string(), 3.0);
        params.intercept = 1.0;
        let before = params.clone();
        sgd.step(&mut params, &LinearParams::gradient(&[("a", 1.0)], 0.0));
        assert_eq!(params, before);
    }

    #[test]
    fn test_linear_params_dot_ignores_unknown_weights() {
        let mut params = LinearParams::default();
        params.weights.insert("a".to_string(), 2.0);
        params.intercept = 0.5;
        assert_eq!(params.dot(&[("a", 3.0), ("z", 100.0)]), 6.5);
    }
}
