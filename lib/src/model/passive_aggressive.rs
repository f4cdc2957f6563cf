//! Passive-aggressive binary classifier.
//!
//! On each observation the weights move just enough to classify it with a
//! hinge margin of one, capped by the aggressiveness parameter `C`
//! (Crammer et al., 2006).

use crate::error::{EstimatorError, Result};
use crate::estimator::{require_target, Estimator, Role};
use crate::observation::{Label, Observation, Prediction, Target};
use crate::optim::losses::sigmoid;
use crate::optim::{Hinge, LinearParams, Loss};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Step size rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaMode {
    /// Unbounded step `loss / ||x||^2`.
    Pa,
    /// Step clipped at `C`.
    PaI,
    /// Step `loss / (||x||^2 + 1 / (2C))`.
    PaII,
}

#[derive(Clone, Debug)]
pub struct PAClassifier {
    c: f64,
    mode: PaMode,
    params: LinearParams,
    loss: Hinge,
}

impl Default for PAClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PAClassifier {
    /// PA-I with `C = 1.0`.
    pub fn new() -> Self {
        Self {
            c: 1.0,
            mode: PaMode::PaI,
            params: LinearParams::default(),
            loss: Hinge::default(),
        }
    }

    /// Set the aggressiveness parameter.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] unless `c > 0`.
    pub fn with_c(mut self, c: f64) -> Result<Self> {
        if !(c > 0.0) {
            return Err(EstimatorError::InvalidParameter(format!(
                "PAClassifier C must be positive, got {}",
                c
            )));
        }
        self.c = c;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: PaMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.params.weights
    }

    fn step_size(&self, loss: f64, norm: f64) -> f64 {
        match self.mode {
            PaMode::Pa => loss / norm,
            PaMode::PaI => self.c.min(loss / norm),
            PaMode::PaII => loss / (norm + 0.5 / self.c),
        }
    }

    fn margin(&self, x: &Observation) -> Result<f64> {
        let features = x.numeric_features()?;
        Ok(self.params.dot(&features))
    }
}

impl Estimator for PAClassifier {
    fn name(&self) -> String {
        "PAClassifier".to_string()
    }

    fn role(&self) -> Role {
        Role::BinaryClassifier
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let y = if require_target(self, y)?.binary()? { 1.0 } else { 0.0 };
        let features = x.numeric_features()?;
        let margin = self.params.dot(&features);
        let loss = self.loss.loss(y, margin);
        let norm: f64 = features.iter().map(|(_, v)| v * v).sum();
        if loss == 0.0 || norm == 0.0 {
            return Ok(());
        }

        let tau = self.step_size(loss, norm);
        let signed = if y > 0.0 { 1.0 } else { -1.0 };
        for (name, value) in features {
            *self.params.weights.entry(name.to_string()).or_insert(0.0) += tau * signed * value;
        }
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        Ok(Prediction::Label(Label::Bool(self.margin(x)? > 0.0)))
    }

    fn predict_proba(&self, x: &Observation) -> Result<BTreeMap<Label, f64>> {
        let p = sigmoid(self.margin(x)?);
        Ok(BTreeMap::from([
            (Label::Bool(false), 1.0 - p),
            (Label::Bool(true), p),
        ]))
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
