//! The whole-matrix contract expected by batch tooling.

use ndarray::Array2;

use crate::error::Result;
use crate::estimator::Role;
use crate::observation::{Prediction, Target};

/// Trait for estimators driven with whole matrices.
///
/// Rows of `x` are samples and columns are features. A fitted estimator
/// remembers its column count and rejects matrices of a different width.
///
/// # Guarantees
/// - `fit` on the same data twice gives the same model.
/// - `predict` and `transform` return one row per input row.
pub trait BatchEstimator {
    /// Fit from scratch on `x` and the optional targets, one per row.
    ///
    /// # Errors
    /// - [`EstimatorError::EmptyInput`](crate::error::EstimatorError::EmptyInput)
    ///   if `x` has no rows.
    /// - [`EstimatorError::ShapeMismatch`](crate::error::EstimatorError::ShapeMismatch)
    ///   if `y` does not have one target per row.
    fn fit(&mut self, x: &Array2<f64>, y: Option<&[Target]>) -> Result<&mut Self>
    where
        Self: Sized;

    /// Continue learning from the current state.
    fn partial_fit(&mut self, x: &Array2<f64>, y: Option<&[Target]>) -> Result<&mut Self>
    where
        Self: Sized;

    /// One prediction per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Prediction>>;

    /// Transformed matrix with one row per input row.
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    fn role(&self) -> Role;

    /// Name used in check reports. Defaults to the type name without its path.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    /// Number of columns seen during fit, `None` before fitting.
    fn n_features_in(&self) -> Option<usize>;
}
