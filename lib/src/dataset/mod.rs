//! Deterministic synthetic streams for checking and benchmarking estimators.
//!
//! A [`SyntheticStream`] is a finite sequence of `(Observation, Option<Target>)`
//! pairs with numeric features named `x0 .. x{n-1}`. The kind of target is
//! chosen by [`StreamKind`], usually derived from an estimator's role with
//! [`StreamKind::for_role`].
//!
//! # Example
//!
//! ```rust
//! use streamlearn::dataset::{StreamKind, SyntheticStream};
//!
//! let stream = SyntheticStream::generate(StreamKind::BinaryClassification, 20, 3, 42);
//! assert_eq!(stream.len(), 20);
//!
//! // Rows 0..8 as a dense matrix
//! let (x, y) = stream.get_batch(0..8);
//! assert_eq!(x.dim(), (8, 3));
//! assert_eq!(y.map(|y| y.len()), Some(8));
//! ```

mod synthetic;

pub use self::synthetic::{feature_name, SyntheticStream};

use crate::estimator::Role;
use serde::{Deserialize, Serialize};

/// Kind of target attached to each observation of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    /// `Target::Real` from a noisy linear function.
    Regression,
    /// `Target::Label(Label::Bool)` from the sign of a noisy linear function.
    BinaryClassification,
    /// `Target::Label(Label::Class)` drawn around one center per class.
    MultiClassClassification { n_classes: usize },
    /// No targets.
    Unlabeled,
}

impl StreamKind {
    /// The stream an estimator with `role` learns from.
    ///
    /// Feature selectors get real targets since k-best scoring is supervised.
    pub fn for_role(role: Role, n_classes: usize) -> Self {
        match role {
            Role::Regressor | Role::FeatureSelector => StreamKind::Regression,
            Role::BinaryClassifier => StreamKind::BinaryClassification,
            Role::MultiClassClassifier => StreamKind::MultiClassClassification { n_classes },
            Role::Clusterer | Role::Transformer => StreamKind::Unlabeled,
        }
    }

    /// Whether observations come with a target.
    pub fn is_labeled(self) -> bool {
        !matches!(self, StreamKind::Unlabeled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_kind_for_role() {
        assert_eq!(
            StreamKind::for_role(Role::BinaryClassifier, 3),
            StreamKind::BinaryClassification
        );
        assert_eq!(
            StreamKind::for_role(Role::MultiClassClassifier, 4),
            StreamKind::MultiClassClassification { n_classes: 4 }
        );
        assert_eq!(
            StreamKind::for_role(Role::FeatureSelector, 3),
            StreamKind::Regression
        );
        assert!(!StreamKind::for_role(Role::Clusterer, 3).is_labeled());
    }
}
