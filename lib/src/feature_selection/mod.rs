//! Online feature selection.
//!
//! Selectors have the [`FeatureSelector`](crate::estimator::Role::FeatureSelector)
//! role: their `transform` returns the input observation restricted to the
//! selected features, values unchanged.

pub mod k_best;
pub mod variance;

pub use k_best::SelectKBest;
pub use variance::VarianceThreshold;
