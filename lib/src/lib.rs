//! # streamlearn
//!
//! Online machine learning in Rust: estimators that learn one observation at
//! a time, an algebra for composing them, and checkers that verify every
//! estimator honours the same contract.
//!
//! ## Core Design Principles
//!
//! - **One Contract**: every estimator, composites included, implements
//!   [`Estimator`]: `update` on one observation, then `predict` or
//!   `transform` at any time.
//! - **Explicit Roles**: a [`Role`] tag (regressor, classifier, clusterer,
//!   transformer, feature selector) drives composition rules and checks.
//! - **Checked Composition**: `sequential` and `parallel` reject invalid
//!   combinations at construction time, so a composite that exists is valid.
//! - **Deterministic Checks**: conformance runs use seeded synthetic streams
//!   and report the first violated invariant.
//!
//! ## Quick Start
//!
//! ```rust
//! use streamlearn::check::check_estimator;
//! use streamlearn::compose::sequential;
//! use streamlearn::estimator::Estimator;
//! use streamlearn::model::LogisticRegression;
//! use streamlearn::observation::{Observation, Target};
//! use streamlearn::preprocessing::StandardScaler;
//!
//! let mut model = sequential(StandardScaler::new(), LogisticRegression::new()).unwrap();
//!
//! let x = Observation::from_numeric([("age", 31.0), ("income", 52_000.0)]);
//! model.update(&x, Some(&Target::from(true))).unwrap();
//! let _label = model.predict(&x).unwrap();
//!
//! // A fresh pipeline passes the conformance checker
//! let mut fresh = sequential(StandardScaler::new(), LogisticRegression::new()).unwrap();
//! assert!(check_estimator(&mut fresh).is_ok());
//! ```
//!
//! ## Module Structure
//!
//! - `observation`: Feature maps, targets, labels and predictions
//! - `estimator`: The [`Estimator`] trait and [`Role`] tags
//! - `stats`: Running univariate and bivariate statistics
//! - `optim`: Losses and the SGD optimizer behind the linear models
//! - `preprocessing`: Scalers, encoders and feature extenders
//! - `feature_selection`: Variance threshold and k-best selection
//! - `model`: Linear, passive-aggressive, naive Bayes and one-vs-rest models
//! - `cluster`: Streaming k-means
//! - `compose`: Pipelines and transformer unions
//! - `dataset`: Seeded synthetic streams
//! - `check`: The native conformance checker
//! - `compat`: Whole-matrix adapter and its checks

/// Error type and result alias.
pub mod error;

/// Streaming data model.
pub mod observation;

/// The incremental estimator contract.
pub mod estimator;

/// Running statistics.
pub mod stats;

/// Losses and optimizers for online linear models.
pub mod optim;

/// Streaming preprocessing transformers.
pub mod preprocessing;

/// Streaming feature selectors.
pub mod feature_selection;

/// Online supervised models.
pub mod model;

/// Online clustering.
pub mod cluster;

/// Sequential and parallel composition.
pub mod compose;

/// Synthetic streams for checks and benchmarks.
pub mod dataset;

pub mod check;

pub mod compat;

pub use error::{EstimatorError, Result};
pub use estimator::{factory, Estimator, EstimatorFactory, Role};
pub use observation::{Label, Observation, Prediction, Target, Value};
