//! Failures and reports produced by the conformance checkers.

use crate::error::{EstimatorError, Result};
use crate::estimator::Role;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Property of the estimator contract a check verifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Invariant {
    /// The check configuration itself is usable.
    Configuration,
    /// Before any update, output either succeeds or fails with `NotFitted`.
    UnfittedBehaviour,
    /// `update` succeeds on a well-formed stream.
    UpdateSucceeds,
    /// `update` leaves the observation and target untouched.
    InputImmutable,
    /// Output no longer fails with `NotFitted` after an update.
    FittedAfterUpdate,
    /// Output fails with an error other than `NotFitted`.
    OperationFailed,
    /// Repeated output without an update is identical.
    Determinism,
    /// Output lies in the range allowed by the role.
    OutputRange,
    /// `role()` does not change while learning.
    RoleStable,
    /// Batch `fit` rejects a matrix without rows.
    EmptyInputRejected,
    /// Batch output has one row per input row.
    OutputShape,
    /// Fitting twice on the same data gives the same model.
    FitIdempotent,
    /// Batch calls with a different column count are rejected.
    FeatureCount,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Invariant::Configuration => "configuration",
            Invariant::UnfittedBehaviour => "unfitted behaviour",
            Invariant::UpdateSucceeds => "update succeeds",
            Invariant::InputImmutable => "input immutable",
            Invariant::FittedAfterUpdate => "fitted after update",
            Invariant::OperationFailed => "operation succeeds",
            Invariant::Determinism => "determinism",
            Invariant::OutputRange => "output range",
            Invariant::RoleStable => "role stable",
            Invariant::EmptyInputRejected => "empty input rejected",
            Invariant::OutputShape => "output shape",
            Invariant::FitIdempotent => "fit idempotent",
            Invariant::FeatureCount => "feature count",
        };
        f.write_str(name)
    }
}

/// First violated invariant of a checked estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[error("{estimator} ({role}) violated '{invariant}'{}: {reason}", location(.step, .index))]
pub struct CheckFailure {
    pub estimator: String,
    pub role: Role,
    /// Path of composite steps that raised the error, outermost first.
    pub step: Option<String>,
    /// Index of the observation (or batch row) being checked.
    pub index: Option<usize>,
    pub invariant: Invariant,
    pub reason: String,
}

fn location(step: &Option<String>, index: &Option<usize>) -> String {
    match (step, index) {
        (Some(step), Some(index)) => format!(" at observation {} in {}", index, step),
        (Some(step), None) => format!(" in {}", step),
        (None, Some(index)) => format!(" at observation {}", index),
        (None, None) => String::new(),
    }
}

impl CheckFailure {
    pub fn new(
        estimator: impl Into<String>,
        role: Role,
        invariant: Invariant,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            estimator: estimator.into(),
            role,
            step: None,
            index: None,
            invariant,
            reason: reason.into(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Build a failure from an estimator error, locating the failing step
    /// when the error was raised inside a composite.
    pub fn from_error(
        estimator: impl Into<String>,
        role: Role,
        invariant: Invariant,
        error: &EstimatorError,
    ) -> Self {
        let path = error.step_path();
        let step = if path.is_empty() {
            None
        } else {
            Some(
                path.iter()
                    .map(|(index, name)| format!("step {} ({})", index, name))
                    .collect::<Vec<_>>()
                    .join(" > "),
            )
        };
        Self {
            step,
            ..Self::new(estimator, role, invariant, error.root_cause().to_string())
        }
    }
}

/// Result of checking one estimator in a suite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Outcome {
    Passed,
    Failed(CheckFailure),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SuiteEntry {
    pub estimator: String,
    pub outcome: Outcome,
}

/// Outcomes of a whole suite, one entry per estimator factory.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SuiteReport {
    pub entries: Vec<SuiteEntry>,
}

impl SuiteReport {
    pub fn push(&mut self, estimator: impl Into<String>, result: std::result::Result<(), CheckFailure>) {
        let outcome = match result {
            Ok(()) => Outcome::Passed,
            Err(failure) => Outcome::Failed(failure),
        };
        self.entries.push(SuiteEntry {
            estimator: estimator.into(),
            outcome,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn n_passed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == Outcome::Passed)
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.n_passed() == self.entries.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckFailure> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Passed => None,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_with_location() {
        let failure = CheckFailure::new("GaussianNB", Role::MultiClassClassifier, Invariant::OutputRange, "label 9 never seen")
            .at(4);
        assert_eq!(
            failure.to_string(),
            "GaussianNB (MultiClassClassifier) violated 'output range' at observation 4: label 9 never seen"
        );
    }

    #[test]
    fn test_failure_from_step_error() {
        let err = EstimatorError::NotFitted {
            estimator: "StandardScaler".to_string(),
        }
        .in_step(0, "StandardScaler");
        let failure = CheckFailure::from_error(
            "StandardScaler | LinearRegression",
            Role::Regressor,
            Invariant::FittedAfterUpdate,
            &err,
        )
        .at(0);
        assert_eq!(failure.step.as_deref(), Some("step 0 (StandardScaler)"));
        assert!(failure.reason.contains("Not fitted"));
        assert!(failure.to_string().contains("in step 0 (StandardScaler)"));
    }

    #[test]
    fn test_suite_report_counts() {
        let mut report = SuiteReport::default();
        report.push("A", Ok(()));
        report.push(
            "B",
            Err(CheckFailure::new("B", Role::Regressor, Invariant::Determinism, "differs")),
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report.n_passed(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.failures().count(), 1);
        assert!(report.to_json().unwrap().contains("Determinism"));
    }
}
