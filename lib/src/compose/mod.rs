//! Composition of estimators into pipelines and unions.
//!
//! | Builder | Composite | Semantics |
//! |---------|-----------|-----------|
//! | [`sequential`] | [`Pipeline`] | output of each step feeds the next |
//! | [`parallel`] | [`TransformerUnion`] | every member sees the same input, outputs are merged |
//!
//! Both composites implement [`Estimator`] themselves, so they nest freely:
//!
//! ```
//! use streamlearn::compose::{parallel, sequential};
//! use streamlearn::estimator::{Estimator, Role};
//! use streamlearn::model::LogisticRegression;
//! use streamlearn::preprocessing::{MinMaxScaler, StandardScaler};
//!
//! let features = parallel(MinMaxScaler::new(), StandardScaler::new()).unwrap();
//! let model = sequential(features, LogisticRegression::new()).unwrap();
//! assert_eq!(model.role(), Role::BinaryClassifier);
//! assert_eq!(model.name(), "(MinMaxScaler + StandardScaler) | LogisticRegression");
//! ```
//!
//! Composites take their members by value, so an estimator can only ever be
//! owned by one composite.
//!
//! Chaining onto an existing pipeline appends to it, and merging into an
//! existing union adds a member, so `sequential(sequential(a, b), c)` has the
//! three steps `a | b | c`. A union used as a pipeline step (or a pipeline
//! used as a union member) stays nested.

mod pipeline;
mod union;

pub use pipeline::Pipeline;
pub use union::TransformerUnion;

use std::any::Any;

use crate::error::Result;
use crate::estimator::Estimator;

/// Chain `first` into `second` (`first then second`).
///
/// # Errors
/// [`EstimatorError::IncompatibleRoles`](crate::error::EstimatorError::IncompatibleRoles)
/// if `first` is a terminal predictor.
pub fn sequential<A, B>(first: A, second: B) -> Result<Pipeline>
where
    A: Estimator + 'static,
    B: Estimator + 'static,
{
    let mut steps = pipeline_steps(first);
    steps.extend(pipeline_steps(second));
    Pipeline::new(steps)
}

/// Merge `left` and `right` side by side (`left plus right`).
///
/// # Errors
/// - [`EstimatorError::RoleConflict`](crate::error::EstimatorError::RoleConflict)
///   unless both are transformers or both are feature selectors.
/// - [`EstimatorError::DuplicateMember`](crate::error::EstimatorError::DuplicateMember)
///   if both have the same name.
pub fn parallel<A, B>(left: A, right: B) -> Result<TransformerUnion>
where
    A: Estimator + 'static,
    B: Estimator + 'static,
{
    let mut members = union_members(left);
    members.extend(union_members(right));
    TransformerUnion::from_named(members)
}

/// Steps of `estimator` if it is a pipeline, otherwise `estimator` itself.
fn pipeline_steps<E: Estimator + 'static>(estimator: E) -> Vec<Box<dyn Estimator>> {
    let mut slot = Some(estimator);
    if let Some(pipeline) = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<Pipeline>>()
        .and_then(Option::take)
    {
        return pipeline.into_steps();
    }
    slot.into_iter()
        .map(|e| Box::new(e) as Box<dyn Estimator>)
        .collect()
}

/// Named members of `estimator` if it is a union, otherwise `estimator` itself.
fn union_members<E: Estimator + 'static>(estimator: E) -> Vec<(String, Box<dyn Estimator>)> {
    let mut slot = Some(estimator);
    if let Some(union) = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<TransformerUnion>>()
        .and_then(Option::take)
    {
        return union.into_members();
    }
    slot.into_iter()
        .map(|e| (e.name(), Box::new(e) as Box<dyn Estimator>))
        .collect()
}

/// Wrap a composite's name in parentheses when it nests inside another.
pub(crate) fn nested_name(estimator: &dyn Estimator) -> String {
    let name = estimator.name();
    if name.contains(" | ") || name.contains(" + ") {
        format!("({})", name)
    } else {
        name
    }
}
