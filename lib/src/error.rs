//! Error types shared by estimators, composites and the batch adapter.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Error type for estimator, composition and adapter operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    /// A feature or target has a different type than previously seen.
    #[error("Type mismatch for '{feature}': expected {expected}, got {got}")]
    TypeMismatch {
        feature: String,
        expected: String,
        got: String,
    },

    /// A supervised learner was updated without a target.
    #[error("Missing target: {estimator} is supervised and needs a target to learn")]
    MissingTarget { estimator: String },

    /// Prediction or transformation was requested before any update.
    #[error("Not fitted: {estimator} needs at least one update before use")]
    NotFitted { estimator: String },

    /// The operation is not offered by the estimator's role.
    #[error("Unsupported operation: {estimator} does not support {operation}")]
    UnsupportedOperation {
        estimator: String,
        operation: String,
    },

    /// Sequential composition with roles that cannot be chained.
    #[error("Incompatible roles: cannot chain {left} into {right}")]
    IncompatibleRoles { left: String, right: String },

    /// Parallel composition with roles that cannot be merged.
    #[error("Role conflict: cannot merge {left} with {right}")]
    RoleConflict { left: String, right: String },

    /// Two union members share the same name.
    #[error("Duplicate member '{name}' in union")]
    DuplicateMember { name: String },

    /// Two union members produced the same namespaced key.
    #[error("Key collision: '{key}' produced by more than one union member")]
    KeyCollision { key: String },

    /// A batch call received a matrix without rows.
    #[error("Empty input: at least one row is required")]
    EmptyInput,

    /// Batch dimensions disagree.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Invalid hyperparameter or construction argument.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid check configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure raised by a step inside a pipeline or union.
    #[error("Step {index} ({name}) failed: {source}")]
    Step {
        index: usize,
        name: String,
        #[source]
        source: Box<EstimatorError>,
    },
}

impl EstimatorError {
    /// Wrap an error with the identity of the composite step that raised it.
    pub fn in_step(self, index: usize, name: impl Into<String>) -> Self {
        EstimatorError::Step {
            index,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with any step wrappers removed.
    pub fn root_cause(&self) -> &EstimatorError {
        match self {
            EstimatorError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Path of step names from the outermost composite to the failing step.
    pub fn step_path(&self) -> Vec<(usize, &str)> {
        let mut path = Vec::new();
        let mut current = self;
        while let EstimatorError::Step {
            index,
            name,
            source,
        } = current
        {
            path.push((*index, name.as_str()));
            current = source;
        }
        path
    }

    /// Whether the root cause is [`EstimatorError::NotFitted`].
    pub fn is_not_fitted(&self) -> bool {
        matches!(self.root_cause(), EstimatorError::NotFitted { .. })
    }
}

impl From<serde_json::Error> for EstimatorError {
    fn from(err: serde_json::Error) -> Self {
        EstimatorError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_type_mismatch() {
        let err = EstimatorError::TypeMismatch {
            feature: "x0".to_string(),
            expected: "numeric".to_string(),
            got: "categorical".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch for 'x0': expected numeric, got categorical"
        );
    }

    #[test]
    fn test_error_display_not_fitted() {
        let err = EstimatorError::NotFitted {
            estimator: "StandardScaler".to_string(),
        };
        assert!(err.to_string().contains("Not fitted"));
        assert!(err.to_string().contains("StandardScaler"));
    }

    #[test]
    fn test_error_display_incompatible_roles() {
        let err = EstimatorError::IncompatibleRoles {
            left: "BinaryClassifier".to_string(),
            right: "Regressor".to_string(),
        };
        assert!(err.to_string().contains("Incompatible roles"));
    }

    #[test]
    fn test_error_display_empty_input() {
        assert_eq!(
            EstimatorError::EmptyInput.to_string(),
            "Empty input: at least one row is required"
        );
    }

    #[test]
    fn test_step_wrapping_keeps_root_cause() {
        let err = EstimatorError::NotFitted {
            estimator: "GaussianNB".to_string(),
        }
        .in_step(1, "GaussianNB")
        .in_step(0, "StandardScaler | GaussianNB");

        assert!(err.is_not_fitted());
        assert_eq!(
            err.step_path(),
            vec![(0, "StandardScaler | GaussianNB"), (1, "GaussianNB")]
        );
        assert!(matches!(
            err.root_cause(),
            EstimatorError::NotFitted { .. }
        ));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: EstimatorError = json_err.into();
        assert!(matches!(err, EstimatorError::Config(_)));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = EstimatorError::InvalidParameter("k".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
