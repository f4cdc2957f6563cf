//! Native conformance checker.
//!
//! Drives an estimator through a deterministic synthetic stream and verifies
//! the estimator contract one observation at a time. The checker is a small
//! state machine:
//!
//! ```text
//! Init ──▶ Streaming { index } ──▶ Finished
//! ```
//!
//! - **Init**: output before any update either succeeds or fails with
//!   `NotFitted`.
//! - **Streaming**: exactly one `update` per observation, then input
//!   immutability, fittedness, determinism and role-specific output ranges.
//! - **Finished**: the role is unchanged and transformer outputs over the
//!   whole stream stay within [`CheckConfig::transform_bound`].
//!
//! The first violation stops the run and is returned as a [`CheckFailure`].
//!
//! # Example
//! ```
//! use streamlearn::check::check_estimator;
//! use streamlearn::compose::sequential;
//! use streamlearn::model::LogisticRegression;
//! use streamlearn::preprocessing::StandardScaler;
//!
//! let mut model = sequential(StandardScaler::new(), LogisticRegression::new()).unwrap();
//! assert!(check_estimator(&mut model).is_ok());
//! ```

mod config;
mod report;

pub use config::CheckConfig;
pub use report::{CheckFailure, Invariant, Outcome, SuiteEntry, SuiteReport};

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::dataset::{StreamKind, SyntheticStream};
use crate::error::EstimatorError;
use crate::estimator::{Estimator, EstimatorFactory, Role};
use crate::observation::{Label, Observation, Prediction, Target, Value};

/// Tolerance on the sum of class probabilities.
const PROBA_TOLERANCE: f64 = 1e-6;

/// Phase of a conformance run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckerState {
    Init,
    Streaming { index: usize },
    Finished,
}

/// Output of `predict` or `transform`, depending on the role.
#[derive(Clone, Debug)]
enum Output {
    Prediction(Prediction),
    Transformed(Observation),
}

impl Output {
    fn produce(estimator: &dyn Estimator, x: &Observation) -> Result<Self, EstimatorError> {
        if estimator.role().is_predictor() {
            estimator.predict(x).map(Output::Prediction)
        } else {
            estimator.transform(x).map(Output::Transformed)
        }
    }

    /// Equality that treats floats by bit pattern, so NaN equals NaN.
    fn bits_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Output::Prediction(Prediction::Real(a)), Output::Prediction(Prediction::Real(b))) => {
                a.to_bits() == b.to_bits()
            }
            (Output::Prediction(a), Output::Prediction(b)) => a == b,
            (Output::Transformed(a), Output::Transformed(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| {
                        ka == kb && value_bits_eq(va, vb)
                    })
            }
            _ => false,
        }
    }
}

fn value_bits_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Numeric(a), Value::Numeric(b)) => a.to_bits() == b.to_bits(),
        (a, b) => a == b,
    }
}

fn proba_bits_eq(a: &BTreeMap<Label, f64>, b: &BTreeMap<Label, f64>) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|((la, pa), (lb, pb))| la == lb && pa.to_bits() == pb.to_bits())
}

/// Conformance checker for one estimator at a time.
#[derive(Clone, Debug)]
pub struct ConformanceChecker {
    config: CheckConfig,
    state: CheckerState,
}

impl ConformanceChecker {
    /// Create a checker.
    ///
    /// # Errors
    /// Returns [`EstimatorError::Config`] for an invalid configuration.
    pub fn new(config: CheckConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        Ok(Self {
            config,
            state: CheckerState::Init,
        })
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Phase reached by the last run.
    pub fn state(&self) -> CheckerState {
        self.state
    }

    /// Check `estimator` against the contract, stopping at the first violation.
    pub fn run(&mut self, estimator: &mut dyn Estimator) -> Result<(), CheckFailure> {
        let name = estimator.name();
        let role = estimator.role();
        let kind = StreamKind::for_role(role, self.config.n_classes);
        let stream = SyntheticStream::generate(
            kind,
            self.config.n_samples,
            self.config.n_features,
            self.config.seed,
        );
        debug!(estimator = %name, %role, ?kind, n_samples = stream.len(), "checking estimator");

        let ctx = Context { name, role };
        let result = self.run_stream(estimator, &stream, &ctx);
        match &result {
            Ok(()) => debug!(estimator = %ctx.name, "estimator passed"),
            Err(failure) => warn!(estimator = %ctx.name, %failure, "conformance check failed"),
        }
        result
    }

    fn run_stream(
        &mut self,
        estimator: &mut dyn Estimator,
        stream: &SyntheticStream,
        ctx: &Context,
    ) -> Result<(), CheckFailure> {
        self.state = CheckerState::Init;
        if let Some((x, _)) = stream.iter().next() {
            match Output::produce(estimator, x) {
                Ok(_) => {}
                Err(e) if e.is_not_fitted() => {}
                Err(e) => return Err(ctx.error(Invariant::UnfittedBehaviour, &e)),
            }
        }

        let mut seen_labels = BTreeSet::new();
        for (index, (x, y)) in stream.iter().enumerate() {
            self.state = CheckerState::Streaming { index };
            if let Some(Target::Label(label)) = y {
                seen_labels.insert(label.clone());
            }
            self.check_observation(estimator, x, y, &seen_labels, ctx)
                .map_err(|failure| failure.at(index))?;
        }

        self.state = CheckerState::Finished;
        debug!(estimator = %ctx.name, "stream finished");
        if estimator.role() != ctx.role {
            return Err(ctx.fail(
                Invariant::RoleStable,
                format!("role changed from {} to {}", ctx.role, estimator.role()),
            ));
        }
        if ctx.role.is_transformer() {
            self.check_transform_bound(estimator, stream, ctx)?;
        }
        Ok(())
    }

    fn check_observation(
        &self,
        estimator: &mut dyn Estimator,
        x: &Observation,
        y: Option<&Target>,
        seen_labels: &BTreeSet<Label>,
        ctx: &Context,
    ) -> Result<(), CheckFailure> {
        let x_snapshot = x.clone();
        let y_snapshot = y.cloned();
        estimator
            .update(x, y)
            .map_err(|e| ctx.error(Invariant::UpdateSucceeds, &e))?;
        if *x != x_snapshot || y.cloned() != y_snapshot {
            return Err(ctx.fail(Invariant::InputImmutable, "update modified its input"));
        }

        let first = self.produce(estimator, x, ctx)?;
        let second = self.produce(estimator, x, ctx)?;
        if !first.bits_eq(&second) {
            return Err(ctx.fail(
                Invariant::Determinism,
                format!("repeated output differs: {:?} then {:?}", first, second),
            ));
        }

        self.check_range(estimator, x, &first, seen_labels, ctx)
    }

    fn produce(
        &self,
        estimator: &dyn Estimator,
        x: &Observation,
        ctx: &Context,
    ) -> Result<Output, CheckFailure> {
        Output::produce(estimator, x).map_err(|e| {
            if e.is_not_fitted() {
                ctx.error(Invariant::FittedAfterUpdate, &e)
            } else {
                ctx.error(Invariant::OperationFailed, &e)
            }
        })
    }

    fn check_range(
        &self,
        estimator: &dyn Estimator,
        x: &Observation,
        output: &Output,
        seen_labels: &BTreeSet<Label>,
        ctx: &Context,
    ) -> Result<(), CheckFailure> {
        let out_of_range = |reason: String| Err(ctx.fail(Invariant::OutputRange, reason));
        match (ctx.role, output) {
            (Role::Regressor, Output::Prediction(Prediction::Real(v))) => {
                if !v.is_finite() {
                    return out_of_range(format!("regression output {} is not finite", v));
                }
            }
            // Either boolean is valid from the first update on
            (Role::BinaryClassifier, Output::Prediction(Prediction::Label(Label::Bool(_)))) => {
                self.check_proba(estimator, x, seen_labels, ctx)?;
            }
            (Role::MultiClassClassifier, Output::Prediction(Prediction::Label(label))) => {
                if !seen_labels.contains(label) {
                    return out_of_range(format!("predicted label {} was never observed", label));
                }
                self.check_proba(estimator, x, seen_labels, ctx)?;
            }
            (Role::Clusterer, Output::Prediction(Prediction::Cluster(c))) => {
                match estimator.n_clusters() {
                    Some(k) if *c < k => {}
                    Some(k) => {
                        return out_of_range(format!("cluster {} is not below n_clusters {}", c, k))
                    }
                    None => return out_of_range("clusterer reports no cluster count".to_string()),
                }
            }
            // Selector outputs may be scaled upstream or namespaced by a union
            (Role::Transformer | Role::FeatureSelector, Output::Transformed(out)) => {
                if let Some(key) = first_non_finite(out) {
                    return out_of_range(format!("transformed feature '{}' is not finite", key));
                }
            }
            (role, output) => {
                return out_of_range(format!("{:?} is not a valid output for a {}", output, role));
            }
        }
        Ok(())
    }

    /// Probabilities, when offered, form a distribution over observed labels.
    fn check_proba(
        &self,
        estimator: &dyn Estimator,
        x: &Observation,
        seen_labels: &BTreeSet<Label>,
        ctx: &Context,
    ) -> Result<(), CheckFailure> {
        let proba = match estimator.predict_proba(x) {
            Ok(proba) => proba,
            Err(e) if matches!(e.root_cause(), EstimatorError::UnsupportedOperation { .. }) => {
                return Ok(())
            }
            Err(e) if e.is_not_fitted() => return Err(ctx.error(Invariant::FittedAfterUpdate, &e)),
            Err(e) => return Err(ctx.error(Invariant::OperationFailed, &e)),
        };

        match estimator.predict_proba(x) {
            Ok(again) if proba_bits_eq(&proba, &again) => {}
            _ => {
                return Err(ctx.fail(
                    Invariant::Determinism,
                    "repeated predict_proba differs".to_string(),
                ))
            }
        }

        for (label, p) in &proba {
            if !(0.0..=1.0).contains(p) {
                return Err(ctx.fail(
                    Invariant::OutputRange,
                    format!("probability {} of label {} outside [0, 1]", p, label),
                ));
            }
            let valid_label = match ctx.role {
                Role::BinaryClassifier => matches!(label, Label::Bool(_)),
                _ => seen_labels.contains(label),
            };
            if !valid_label {
                return Err(ctx.fail(
                    Invariant::OutputRange,
                    format!("probability given for unexpected label {}", label),
                ));
            }
        }
        let total: f64 = proba.values().sum();
        if !proba.is_empty() && (total - 1.0).abs() > PROBA_TOLERANCE {
            return Err(ctx.fail(
                Invariant::OutputRange,
                format!("probabilities sum to {}", total),
            ));
        }
        Ok(())
    }

    fn check_transform_bound(
        &self,
        estimator: &dyn Estimator,
        stream: &SyntheticStream,
        ctx: &Context,
    ) -> Result<(), CheckFailure> {
        let bound = self.config.transform_bound;
        for (index, (x, _)) in stream.iter().enumerate() {
            let out = estimator
                .transform(x)
                .map_err(|e| ctx.error(Invariant::OperationFailed, &e).at(index))?;
            for (key, value) in out.iter() {
                if let Value::Numeric(v) = value {
                    if !(v.abs() <= bound) {
                        return Err(ctx
                            .fail(
                                Invariant::OutputRange,
                                format!("'{}' = {} exceeds the bound {}", key, v, bound),
                            )
                            .at(index));
                    }
                }
            }
        }
        Ok(())
    }
}

fn first_non_finite(out: &Observation) -> Option<&str> {
    out.iter().find_map(|(key, value)| match value {
        Value::Numeric(v) if !v.is_finite() => Some(key.as_str()),
        _ => None,
    })
}

/// Identity of the estimator under check.
struct Context {
    name: String,
    role: Role,
}

impl Context {
    fn fail(&self, invariant: Invariant, reason: impl Into<String>) -> CheckFailure {
        CheckFailure::new(self.name.clone(), self.role, invariant, reason)
    }

    fn error(&self, invariant: Invariant, error: &EstimatorError) -> CheckFailure {
        CheckFailure::from_error(self.name.clone(), self.role, invariant, error)
    }
}

/// Check an estimator with the default configuration.
pub fn check_estimator(estimator: &mut dyn Estimator) -> Result<(), CheckFailure> {
    check_estimator_with(estimator, &CheckConfig::default())
}

/// Check an estimator with an explicit configuration.
pub fn check_estimator_with(
    estimator: &mut dyn Estimator,
    config: &CheckConfig,
) -> Result<(), CheckFailure> {
    let mut checker = ConformanceChecker::new(config.clone()).map_err(|e| {
        CheckFailure::from_error(estimator.name(), estimator.role(), Invariant::Configuration, &e)
    })?;
    checker.run(estimator)
}

/// Check a fresh estimator from every factory, independently.
pub fn check_suite(factories: &[EstimatorFactory], config: &CheckConfig) -> SuiteReport {
    let mut report = SuiteReport::default();
    for factory in factories {
        let mut estimator = factory();
        let name = estimator.name();
        let result = check_estimator_with(estimator.as_mut(), config);
        report.push(name, result);
    }
    info!(
        passed = report.n_passed(),
        total = report.len(),
        "conformance suite finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::KMeans;
    use crate::compose::{parallel, sequential};
    use crate::error::Result;
    use crate::estimator::factory;
    use crate::feature_selection::{SelectKBest, VarianceThreshold};
    use crate::model::{GaussianNB, LinearRegression, LogisticRegression};
    use crate::preprocessing::{MinMaxScaler, StandardScaler};
    use crate::stats::PearsonCorrelation;
    use std::cell::Cell;

    /// Regressor whose prediction drifts on every call.
    #[derive(Clone, Debug, Default)]
    struct Flaky {
        calls: Cell<u64>,
    }

    impl Estimator for Flaky {
        fn name(&self) -> String {
            "Flaky".to_string()
        }
        fn role(&self) -> Role {
            Role::Regressor
        }
        fn update(&mut self, _x: &Observation, _y: Option<&Target>) -> Result<()> {
            Ok(())
        }
        fn predict(&self, _x: &Observation) -> Result<Prediction> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            Ok(Prediction::Real(n as f64))
        }
        fn box_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// Binary classifier that answers with a multiclass label.
    #[derive(Clone, Debug)]
    struct WrongLabel;

    impl Estimator for WrongLabel {
        fn name(&self) -> String {
            "WrongLabel".to_string()
        }
        fn role(&self) -> Role {
            Role::BinaryClassifier
        }
        fn update(&mut self, _x: &Observation, _y: Option<&Target>) -> Result<()> {
            Ok(())
        }
        fn predict(&self, _x: &Observation) -> Result<Prediction> {
            Ok(Prediction::Label(Label::Class(3)))
        }
        fn box_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// Transformer that stays unfitted forever.
    #[derive(Clone, Debug)]
    struct NeverFitted;

    impl Estimator for NeverFitted {
        fn name(&self) -> String {
            "NeverFitted".to_string()
        }
        fn role(&self) -> Role {
            Role::Transformer
        }
        fn update(&mut self, _x: &Observation, _y: Option<&Target>) -> Result<()> {
            Ok(())
        }
        fn transform(&self, _x: &Observation) -> Result<Observation> {
            Err(EstimatorError::NotFitted {
                estimator: self.name(),
            })
        }
        fn box_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// Binary classifier that always answers `false`.
    #[derive(Clone, Debug)]
    struct AlwaysFalse;

    impl Estimator for AlwaysFalse {
        fn name(&self) -> String {
            "AlwaysFalse".to_string()
        }
        fn role(&self) -> Role {
            Role::BinaryClassifier
        }
        fn update(&mut self, _x: &Observation, _y: Option<&Target>) -> Result<()> {
            Ok(())
        }
        fn predict(&self, _x: &Observation) -> Result<Prediction> {
            Ok(Prediction::Label(Label::Bool(false)))
        }
        fn box_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// Feature selector that emits NaN for every kept feature.
    #[derive(Clone, Debug)]
    struct NanSelector;

    impl Estimator for NanSelector {
        fn name(&self) -> String {
            "NanSelector".to_string()
        }
        fn role(&self) -> Role {
            Role::FeatureSelector
        }
        fn update(&mut self, _x: &Observation, _y: Option<&Target>) -> Result<()> {
            Ok(())
        }
        fn transform(&self, x: &Observation) -> Result<Observation> {
            Ok(x.keys()
                .map(|k| (k.to_string(), Value::Numeric(f64::NAN)))
                .collect())
        }
        fn box_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// Transformer that blows values up.
    #[derive(Clone, Debug)]
    struct Amplifier;

    impl Estimator for Amplifier {
        fn name(&self) -> String {
            "Amplifier".to_string()
        }
        fn role(&self) -> Role {
            Role::Transformer
        }
        fn update(&mut self, _x: &Observation, _y: Option<&Target>) -> Result<()> {
            Ok(())
        }
        fn transform(&self, x: &Observation) -> Result<Observation> {
            Ok(x.numeric_features()?
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::Numeric(v * 1e6)))
                .collect())
        }
        fn box_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_builtin_estimators_pass() {
        let factories: Vec<EstimatorFactory> = vec![
            factory(StandardScaler::new()),
            factory(GaussianNB::new()),
            factory(KMeans::new(5).with_random_state(42)),
            factory(VarianceThreshold::new()),
            factory(SelectKBest::new(PearsonCorrelation::new(), 2)),
            factory(LogisticRegression::new()),
        ];
        let report = check_suite(&factories, &CheckConfig::default());
        assert!(report.all_passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.len(), 6);
    }

    #[test]
    fn test_checker_reaches_finished() {
        let mut checker = ConformanceChecker::new(CheckConfig::default()).unwrap();
        assert_eq!(checker.state(), CheckerState::Init);
        checker.run(&mut LinearRegression::new()).unwrap();
        assert_eq!(checker.state(), CheckerState::Finished);
    }

    #[test]
    fn test_nondeterministic_output_detected() {
        let failure = check_estimator(&mut Flaky::default()).unwrap_err();
        assert_eq!(failure.invariant, Invariant::Determinism);
        assert_eq!(failure.index, Some(0));
    }

    #[test]
    fn test_wrong_label_type_detected() {
        let failure = check_estimator(&mut WrongLabel).unwrap_err();
        assert_eq!(failure.invariant, Invariant::OutputRange);
        assert_eq!(failure.role, Role::BinaryClassifier);
    }

    #[test]
    fn test_not_fitted_after_update_detected() {
        let mut checker = ConformanceChecker::new(CheckConfig::default()).unwrap();
        let failure = checker.run(&mut NeverFitted).unwrap_err();
        assert_eq!(failure.invariant, Invariant::FittedAfterUpdate);
        assert_eq!(checker.state(), CheckerState::Streaming { index: 0 });
    }

    #[test]
    fn test_transform_bound_detected() {
        let failure = check_estimator(&mut Amplifier).unwrap_err();
        assert_eq!(failure.invariant, Invariant::OutputRange);
        assert!(failure.reason.contains("exceeds the bound"));
    }

    #[test]
    fn test_failure_inside_pipeline_names_step() {
        let mut pipeline = sequential(NeverFitted, LinearRegression::new()).unwrap();
        let failure = check_estimator(&mut pipeline).unwrap_err();
        assert_eq!(failure.invariant, Invariant::UpdateSucceeds);
        assert_eq!(failure.index, Some(0));
        assert_eq!(failure.step.as_deref(), Some("step 0 (NeverFitted)"));
        assert_eq!(failure.estimator, "NeverFitted | LinearRegression");
    }

    #[test]
    fn test_union_passes() {
        let mut union = parallel(MinMaxScaler::new(), StandardScaler::new()).unwrap();
        assert!(check_estimator(&mut union).is_ok());
    }

    #[test]
    fn test_selector_composites_pass() {
        let mut scaled = sequential(StandardScaler::new(), VarianceThreshold::new()).unwrap();
        assert_eq!(scaled.role(), Role::FeatureSelector);
        assert!(check_estimator(&mut scaled).is_ok());

        let mut union =
            parallel(VarianceThreshold::new(), SelectKBest::new(PearsonCorrelation::new(), 2))
                .unwrap();
        assert_eq!(union.role(), Role::FeatureSelector);
        assert!(check_estimator(&mut union).is_ok());
    }

    #[test]
    fn test_non_finite_selection_detected() {
        let failure = check_estimator(&mut NanSelector).unwrap_err();
        assert_eq!(failure.invariant, Invariant::OutputRange);
        assert_eq!(failure.index, Some(0));
    }

    #[test]
    fn test_binary_classifier_may_predict_either_class() {
        assert!(check_estimator(&mut AlwaysFalse).is_ok());
    }

    #[test]
    fn test_invalid_config_reported() {
        let config = CheckConfig::default().with_n_samples(0);
        let failure = check_estimator_with(&mut StandardScaler::new(), &config).unwrap_err();
        assert_eq!(failure.invariant, Invariant::Configuration);
    }

    #[test]
    fn test_two_runs_same_outcome() {
        let factories: Vec<EstimatorFactory> = vec![
            factory(Flaky::default()),
            factory(StandardScaler::new()),
        ];
        let config = CheckConfig::default().with_seed(11);
        assert_eq!(check_suite(&factories, &config), check_suite(&factories, &config));
    }
}
