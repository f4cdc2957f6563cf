//! Loss functions for online linear models.
//!
//! A loss provides its value (for monitoring) and the gradient with respect
//! to the raw linear output. The gradient is what the model multiplies by the
//! features to get parameter gradients.

use serde::{Deserialize, Serialize};

/// A differentiable loss over one sample.
pub trait Loss: Clone + std::fmt::Debug + Send {
    /// Value of the loss for a raw output `y_pred`.
    fn loss(&self, y_true: f64, y_pred: f64) -> f64;

    /// Gradient of the loss w.r.t. the raw output: ∂L/∂pred.
    fn gradient(&self, y_true: f64, y_pred: f64) -> f64;
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Squared error `L = (pred - y)^2 / 2`.
///
/// Gradient w.r.t. prediction: `pred - y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Squared;

impl Loss for Squared {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        0.5 * (y_pred - y_true).powi(2)
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        y_pred - y_true
    }
}

/// Binary cross-entropy on logits, `y_true` in {0, 1}.
///
/// Uses the stable formulation `max(z, 0) - z * t + log(1 + exp(-|z|))`.
/// Gradient w.r.t. logits: `σ(z) - t`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Log;

impl Loss for Log {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        y_pred.max(0.0) - y_pred * y_true + (-y_pred.abs()).exp().ln_1p()
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        sigmoid(y_pred) - y_true
    }
}

/// Hinge loss, `y_true` in {0, 1} mapped to {-1, 1}.
///
/// `L = max(0, threshold - y * pred)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hinge {
    pub threshold: f64,
}

impl Default for Hinge {
    fn default() -> Self {
        Self { threshold: 1.0 }
    }
}

impl Hinge {
    fn signed(y_true: f64) -> f64 {
        if y_true > 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

impl Loss for Hinge {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        (self.threshold - Self::signed(y_true) * y_pred).max(0.0)
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        let y = Self::signed(y_true);
        if y * y_pred < self.threshold {
            -y
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_loss_and_gradient() {
        assert_eq!(Squared.loss(1.0, 3.0), 2.0);
        assert_eq!(Squared.gradient(1.0, 3.0), 2.0);
        assert_eq!(Squared.gradient(3.0, 3.0), 0.0);
    }

    #[test]
    fn test_log_loss_at_zero_logit() {
        assert!((Log.loss(1.0, 0.0) - std::f64::consts::LN_2).abs() < 1e-12);
        assert!((Log.gradient(1.0, 0.0) + 0.5).abs() < 1e-12);
        assert!((Log.gradient(0.0, 0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_stable_for_large_logits() {
        assert!(Log.loss(0.0, 1000.0).is_finite());
        assert!(Log.loss(1.0, -1000.0).is_finite());
        assert!(Log.loss(1.0, 1000.0) < 1e-12);
    }

    #[test]
    fn test_hinge_gradient() {
        let hinge = Hinge::default();
        assert_eq!(hinge.gradient(1.0, 2.0), 0.0);
        assert_eq!(hinge.gradient(1.0, 0.5), -1.0);
        assert_eq!(hinge.gradient(0.0, 0.5), 1.0);
        assert_eq!(hinge.loss(0.0, -3.0), 0.0);
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
    }
}
