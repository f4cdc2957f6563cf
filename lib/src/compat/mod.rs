//! Batch compatibility layer.
//!
//! Tooling built around whole-matrix `fit`/`predict`/`transform` calls can
//! drive any streaming [`Estimator`](crate::estimator::Estimator) through
//! [`convert_to_foreign_contract`]. The adapter replays matrix rows through
//! `update`, one observation at a time, with columns named `x0 .. x{n-1}`.
//! Composites are wrapped as a whole, so a pipeline keeps its streaming
//! semantics inside the adapter.
//!
//! [`check_batch_estimator`] verifies the whole-matrix contract for any
//! [`BatchEstimator`].

mod adapter;
mod checks;
mod contract;

pub use adapter::{convert_to_foreign_contract, BatchAdapter};
pub use checks::check_batch_estimator;
pub use contract::BatchEstimator;
