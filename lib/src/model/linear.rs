//! Online linear models for regression and classification.
//!
//! Both models keep a [`LinearParams`] vector keyed by feature name and take
//! one SGD step per observation:
//! - [`LinearRegression`] minimizes the squared loss.
//! - [`LogisticRegression`] minimizes the binary cross-entropy on logits.
//!
//! Weights start at zero, so both models answer `predict` before the first
//! update (0.0 for the regressor, `false` for the classifier).

use crate::error::{EstimatorError, Result};
use crate::estimator::{require_target, Estimator, Role};
use crate::observation::{Label, Observation, Prediction, Target};
use crate::optim::losses::sigmoid;
use crate::optim::{LinearParams, Log, Loss, Optimizer, Squared, SGD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hyperparameters shared by the linear models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    /// SGD learning rate.
    pub learning_rate: f64,
    /// Learn an intercept term.
    pub fit_intercept: bool,
    /// Loss gradients are clamped to `[-clip_gradient, clip_gradient]`.
    pub clip_gradient: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            fit_intercept: true,
            clip_gradient: 1e12,
        }
    }
}

impl LinearConfig {
    fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(EstimatorError::InvalidParameter(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if !(self.clip_gradient > 0.0) {
            return Err(EstimatorError::InvalidParameter(format!(
                "clip_gradient must be positive, got {}",
                self.clip_gradient
            )));
        }
        Ok(())
    }
}

/// Generalized linear model trained by online SGD.
#[derive(Clone, Debug)]
struct OnlineGlm<L: Loss> {
    config: LinearConfig,
    params: LinearParams,
    optimizer: SGD,
    loss: L,
}

impl<L: Loss> OnlineGlm<L> {
    fn new(loss: L) -> Self {
        let config = LinearConfig::default();
        Self {
            optimizer: SGD::new(config.learning_rate),
            config,
            params: LinearParams::default(),
            loss,
        }
    }

    fn with_config(mut self, config: LinearConfig) -> Result<Self> {
        config.validate()?;
        self.optimizer = SGD::new(config.learning_rate);
        self.config = config;
        Ok(self)
    }

    fn raw(&self, features: &[(&str, f64)]) -> f64 {
        self.params.dot(features)
    }

    fn learn(&mut self, features: &[(&str, f64)], y: f64) {
        let clip = self.config.clip_gradient;
        let g = self.loss.gradient(y, self.raw(features)).clamp(-clip, clip);
        let mut gradients = LinearParams::gradient(features, g);
        if !self.config.fit_intercept {
            gradients.intercept = 0.0;
        }
        self.optimizer.step(&mut self.params, &gradients);
    }
}

/// Online least-squares regression.
///
/// # Example
/// ```
/// use streamlearn::estimator::Estimator;
/// use streamlearn::model::LinearRegression;
/// use streamlearn::observation::{Observation, Prediction, Target};
///
/// let mut model = LinearRegression::new().with_learning_rate(0.1).unwrap();
/// for _ in 0..200 {
///     let x = Observation::from_numeric([("x", 1.0)]);
///     model.update(&x, Some(&Target::Real(2.0))).unwrap();
/// }
/// let Prediction::Real(y) = model.predict(&Observation::from_numeric([("x", 1.0)])).unwrap() else {
///     unreachable!()
/// };
/// assert!((y - 2.0).abs() < 1e-3);
/// ```
#[derive(Clone, Debug)]
pub struct LinearRegression {
    glm: OnlineGlm<Squared>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            glm: OnlineGlm::new(Squared),
        }
    }

    /// Replace all hyperparameters at once.
    pub fn with_config(mut self, config: LinearConfig) -> Result<Self> {
        self.glm = self.glm.with_config(config)?;
        Ok(self)
    }

    /// Set the SGD learning rate.
    pub fn with_learning_rate(self, learning_rate: f64) -> Result<Self> {
        let config = LinearConfig {
            learning_rate,
            ..self.glm.config.clone()
        };
        self.with_config(config)
    }

    /// Set whether to learn an intercept.
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.glm.config.fit_intercept = fit_intercept;
        self
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.glm.params.weights
    }

    pub fn intercept(&self) -> f64 {
        self.glm.params.intercept
    }
}

impl Estimator for LinearRegression {
    fn name(&self) -> String {
        "LinearRegression".to_string()
    }

    fn role(&self) -> Role {
        Role::Regressor
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let y = require_target(self, y)?.real()?;
        let features = x.numeric_features()?;
        self.glm.learn(&features, y);
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        let features = x.numeric_features()?;
        Ok(Prediction::Real(self.glm.raw(&features)))
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

/// Online logistic regression for binary targets.
#[derive(Clone, Debug)]
pub struct LogisticRegression {
    glm: OnlineGlm<Log>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            glm: OnlineGlm::new(Log),
        }
    }

    /// Replace all hyperparameters at once.
    pub fn with_config(mut self, config: LinearConfig) -> Result<Self> {
        self.glm = self.glm.with_config(config)?;
        Ok(self)
    }

    /// Set the SGD learning rate.
    pub fn with_learning_rate(self, learning_rate: f64) -> Result<Self> {
        let config = LinearConfig {
            learning_rate,
            ..self.glm.config.clone()
        };
        self.with_config(config)
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.glm.params.weights
    }

    /// Probability of the positive class.
    fn positive_proba(&self, x: &Observation) -> Result<f64> {
        let features = x.numeric_features()?;
        Ok(sigmoid(self.glm.raw(&features)))
    }
}

impl Estimator for LogisticRegression {
    fn name(&self) -> String {
        "LogisticRegression".to_string()
    }

    fn role(&self) -> Role {
        Role::BinaryClassifier
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let y = require_target(self, y)?.binary()?;
        let features = x.numeric_features()?;
        self.glm.learn(&features, if y { 1.0 } else { 0.0 });
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        let p = self.positive_proba(x)?;
        Ok(Prediction::Label(Label::Bool(p > 0.5)))
    }

    fn predict_proba(&self, x: &Observation) -> Result<BTreeMap<Label, f64>> {
        let p = self.positive_proba(x)?;
        Ok(BTreeMap::from([
            (Label::Bool(false), 1.0 - p),
            (Label::Bool(true), p),
        ]))
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
