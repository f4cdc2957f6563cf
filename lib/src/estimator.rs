//! The incremental estimator contract.
//!
//! Every streaming estimator, including pipelines and unions, implements
//! [`Estimator`]. An estimator consumes one [`Observation`] at a time through
//! [`Estimator::update`] and can answer [`Estimator::predict`] or
//! [`Estimator::transform`] after any update.
//!
//! # Guarantees
//! - `update` is the only operation that mutates state.
//! - `predict`/`transform` are pure functions of the current state and input.
//! - `role()` is fixed at construction.
//!
//! # Example
//! ```
//! use streamlearn::estimator::{Estimator, Role};
//! use streamlearn::observation::Observation;
//! use streamlearn::preprocessing::StandardScaler;
//!
//! let mut scaler = StandardScaler::new();
//! assert_eq!(scaler.role(), Role::Transformer);
//!
//! scaler.update(&Observation::from_numeric([("x", 1.0)]), None).unwrap();
//! scaler.update(&Observation::from_numeric([("x", 3.0)]), None).unwrap();
//! let z = scaler.transform(&Observation::from_numeric([("x", 3.0)])).unwrap();
//! assert!((z.get("x").unwrap().as_f64().unwrap() - 1.0).abs() < 1e-12);
//! ```

use crate::error::{EstimatorError, Result};
use crate::observation::{Label, Observation, Prediction, Target};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Functional category of an estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Regressor,
    BinaryClassifier,
    MultiClassClassifier,
    Clusterer,
    Transformer,
    FeatureSelector,
}

impl Role {
    /// Terminal roles that answer `predict`.
    pub fn is_predictor(self) -> bool {
        matches!(
            self,
            Role::Regressor | Role::BinaryClassifier | Role::MultiClassClassifier | Role::Clusterer
        )
    }

    /// Roles that answer `transform` and can feed another step.
    pub fn is_transformer(self) -> bool {
        matches!(self, Role::Transformer | Role::FeatureSelector)
    }

    /// Roles that need a target to learn.
    pub fn is_supervised(self) -> bool {
        matches!(
            self,
            Role::Regressor | Role::BinaryClassifier | Role::MultiClassClassifier
        )
    }

    /// Classification roles.
    pub fn is_classifier(self) -> bool {
        matches!(self, Role::BinaryClassifier | Role::MultiClassClassifier)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Regressor => "Regressor",
            Role::BinaryClassifier => "BinaryClassifier",
            Role::MultiClassClassifier => "MultiClassClassifier",
            Role::Clusterer => "Clusterer",
            Role::Transformer => "Transformer",
            Role::FeatureSelector => "FeatureSelector",
        };
        f.write_str(name)
    }
}

/// Contract implemented by every streaming estimator.
///
/// The trait is object safe; composites store their members as
/// `Box<dyn Estimator>`.
pub trait Estimator: fmt::Debug + Send {
    /// Identity of the estimator, used for union namespacing and reports.
    fn name(&self) -> String;

    /// The fixed role tag.
    fn role(&self) -> Role;

    /// Learn from one observation.
    ///
    /// # Errors
    /// - [`EstimatorError::TypeMismatch`] when a feature or the target has a
    ///   different type than previously seen.
    /// - [`EstimatorError::MissingTarget`] for supervised learners called
    ///   without a target.
    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()>;

    /// Predict for one observation. Offered by predictor roles.
    ///
    /// # Errors
    /// [`EstimatorError::NotFitted`] if the algorithm needs a prior update.
    fn predict(&self, x: &Observation) -> Result<Prediction> {
        let _ = x;
        Err(self.unsupported("predict"))
    }

    /// Class membership probabilities. Offered by some classifiers.
    fn predict_proba(&self, x: &Observation) -> Result<BTreeMap<Label, f64>> {
        let _ = x;
        Err(self.unsupported("predict_proba"))
    }

    /// Transform one observation. Offered by transformer roles.
    ///
    /// # Errors
    /// [`EstimatorError::NotFitted`] if the algorithm needs a prior update.
    fn transform(&self, x: &Observation) -> Result<Observation> {
        let _ = x;
        Err(self.unsupported("transform"))
    }

    /// Number of clusters the estimator may currently assign. Clusterers only.
    fn n_clusters(&self) -> Option<usize> {
        None
    }

    /// Deep copy of the estimator, state included.
    fn box_clone(&self) -> Box<dyn Estimator>;

    /// Error for an operation the role does not offer.
    fn unsupported(&self, operation: &str) -> EstimatorError {
        EstimatorError::UnsupportedOperation {
            estimator: self.name(),
            operation: operation.to_string(),
        }
    }
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Producer of fresh estimator instances, used to parametrize check suites.
pub type EstimatorFactory = Box<dyn Fn() -> Box<dyn Estimator>>;

/// Factory returning a copy of `template` on every call.
///
/// ```
/// use streamlearn::estimator::{factory, EstimatorFactory};
/// use streamlearn::preprocessing::StandardScaler;
///
/// let factories: Vec<EstimatorFactory> = vec![factory(StandardScaler::new())];
/// assert_eq!(factories[0]().name(), "StandardScaler");
/// ```
pub fn factory<E: Estimator + 'static>(template: E) -> EstimatorFactory {
    Box::new(move || template.box_clone())
}

/// Require a target for supervised learners.
pub(crate) fn require_target<'a>(
    estimator: &dyn Estimator,
    y: Option<&'a Target>,
) -> Result<&'a Target> {
    y.ok_or_else(|| EstimatorError::MissingTarget {
        estimator: estimator.name(),
    })
}
