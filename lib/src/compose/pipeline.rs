//! Sequential pipeline of estimators.
//!
//! A Pipeline chains estimators so that the transformed observation of step
//! `i` becomes the input of step `i + 1`. Every step but the last must have a
//! transformer role; the pipeline's role is the role of its last step.
//!
//! # Example
//! ```
//! use streamlearn::compose::Pipeline;
//! use streamlearn::estimator::{Estimator, Role};
//! use streamlearn::model::LinearRegression;
//! use streamlearn::observation::{Observation, Target};
//! use streamlearn::preprocessing::StandardScaler;
//!
//! let mut pipeline = Pipeline::new(vec![
//!     Box::new(StandardScaler::new()),
//!     Box::new(LinearRegression::new()),
//! ])
//! .unwrap();
//! assert_eq!(pipeline.role(), Role::Regressor);
//!
//! let x = Observation::from_numeric([("x", 1.0)]);
//! pipeline.update(&x, Some(&Target::Real(2.0))).unwrap();
//! assert!(pipeline.predict(&x).is_ok());
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::compose::nested_name;
use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Label, Observation, Prediction, Target};

/// Ordered chain of owned estimators.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Box<dyn Estimator>>,
}

impl Pipeline {
    /// Build a pipeline from its steps.
    ///
    /// # Errors
    /// - [`EstimatorError::InvalidParameter`] for an empty step list.
    /// - [`EstimatorError::IncompatibleRoles`] if a non-final step is not a
    ///   transformer (a predictor followed by anything).
    pub fn new(steps: Vec<Box<dyn Estimator>>) -> Result<Self> {
        if steps.is_empty() {
            return Err(EstimatorError::InvalidParameter(
                "Cannot build an empty pipeline".to_string(),
            ));
        }
        for pair in steps.windows(2) {
            check_chain(pair[0].as_ref(), pair[1].as_ref())?;
        }
        Ok(Self { steps })
    }

    /// Append a step at the end of the pipeline.
    ///
    /// # Errors
    /// [`EstimatorError::IncompatibleRoles`] if the current last step is a
    /// terminal predictor.
    pub fn then<E: Estimator + 'static>(mut self, step: E) -> Result<Self> {
        check_chain(self.terminal(), &step)?;
        self.steps.push(Box::new(step));
        Ok(self)
    }

    /// Get the number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// A pipeline always has at least one step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the names of all steps in the pipeline.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Borrow the steps.
    pub fn steps(&self) -> &[Box<dyn Estimator>] {
        &self.steps
    }

    pub(crate) fn into_steps(self) -> Vec<Box<dyn Estimator>> {
        self.steps
    }

    fn terminal(&self) -> &dyn Estimator {
        // new() rejects empty step lists
        self.steps[self.steps.len() - 1].as_ref()
    }

    /// Run `x` through every step but the last.
    fn transform_prefix<'a>(&self, x: &'a Observation) -> Result<Cow<'a, Observation>> {
        let mut current = Cow::Borrowed(x);
        for (index, step) in self.steps[..self.steps.len() - 1].iter().enumerate() {
            let next = step
                .transform(&current)
                .map_err(|e| e.in_step(index, step.name()))?;
            current = Cow::Owned(next);
        }
        Ok(current)
    }

    fn terminal_index(&self) -> usize {
        self.steps.len() - 1
    }
}

fn check_chain(left: &dyn Estimator, right: &dyn Estimator) -> Result<()> {
    if left.role().is_transformer() {
        Ok(())
    } else {
        Err(EstimatorError::IncompatibleRoles {
            left: format!("{} ({})", left.name(), left.role()),
            right: format!("{} ({})", right.name(), right.role()),
        })
    }
}

impl Estimator for Pipeline {
    fn name(&self) -> String {
        self.steps
            .iter()
            .map(|s| nested_name(s.as_ref()))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn role(&self) -> Role {
        self.terminal().role()
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let last = self.terminal_index();
        let mut current = Cow::Borrowed(x);
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.update(&current, y)
                .map_err(|e| e.in_step(index, step.name()))?;
            if index < last {
                let next = step
                    .transform(&current)
                    .map_err(|e| e.in_step(index, step.name()))?;
                current = Cow::Owned(next);
            }
        }
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        if !self.role().is_predictor() {
            return Err(self.unsupported("predict"));
        }
        let current = self.transform_prefix(x)?;
        self.terminal()
            .predict(&current)
            .map_err(|e| e.in_step(self.terminal_index(), self.terminal().name()))
    }

    fn predict_proba(&self, x: &Observation) -> Result<BTreeMap<Label, f64>> {
        if !self.role().is_classifier() {
            return Err(self.unsupported("predict_proba"));
        }
        let current = self.transform_prefix(x)?;
        self.terminal()
            .predict_proba(&current)
            .map_err(|e| match e {
                // Keep the plain error so callers can probe support
                EstimatorError::UnsupportedOperation { .. } => e,
                other => other.in_step(self.terminal_index(), self.terminal().name()),
            })
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        if !self.role().is_transformer() {
            return Err(self.unsupported("transform"));
        }
        let current = self.transform_prefix(x)?;
        self.terminal()
            .transform(&current)
            .map_err(|e| e.in_step(self.terminal_index(), self.terminal().name()))
    }

    fn n_clusters(&self) -> Option<usize> {
        self.terminal().n_clusters()
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
