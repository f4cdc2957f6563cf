//! Streaming estimators behind the whole-matrix contract.

use ndarray::{Array2, ArrayView1};
use tracing::info;

use crate::compat::contract::BatchEstimator;
use crate::dataset::feature_name;
use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Prediction, Target, Value, ValueKind};

/// Wrap a streaming estimator for batch tooling.
///
/// ```
/// use ndarray::array;
/// use streamlearn::compat::{convert_to_foreign_contract, BatchEstimator};
/// use streamlearn::preprocessing::StandardScaler;
///
/// let mut adapter = convert_to_foreign_contract(StandardScaler::new());
/// let x = array![[1.0, 10.0], [3.0, 30.0]];
/// let z = adapter.fit(&x, None).unwrap().transform(&x).unwrap();
/// assert_eq!(z.dim(), (2, 2));
/// ```
pub fn convert_to_foreign_contract<E: Estimator + 'static>(estimator: E) -> BatchAdapter {
    BatchAdapter::new(Box::new(estimator))
}

/// [`BatchEstimator`] backed by a streaming [`Estimator`].
///
/// `fit` replays rows through `update` on a fresh copy of the template, so
/// the wrapped estimator is never modified.
#[derive(Clone, Debug)]
pub struct BatchAdapter {
    template: Box<dyn Estimator>,
    fitted: Option<Box<dyn Estimator>>,
    n_features_in: Option<usize>,
}

impl BatchAdapter {
    pub fn new(template: Box<dyn Estimator>) -> Self {
        Self {
            template,
            fitted: None,
            n_features_in: None,
        }
    }

    /// The estimator after the last fit.
    pub fn fitted_estimator(&self) -> Option<&dyn Estimator> {
        self.fitted.as_deref()
    }

    fn fitted(&self) -> Result<&dyn Estimator> {
        self.fitted
            .as_deref()
            .ok_or_else(|| EstimatorError::NotFitted {
                estimator: self.template.name(),
            })
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        match self.n_features_in {
            Some(n) if n != x.ncols() => Err(EstimatorError::ShapeMismatch {
                expected: format!("{} columns", n),
                got: format!("{} columns", x.ncols()),
            }),
            _ => Ok(()),
        }
    }

    fn replay(
        estimator: &mut dyn Estimator,
        x: &Array2<f64>,
        y: Option<&[Target]>,
    ) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EstimatorError::EmptyInput);
        }
        if let Some(y) = y {
            if y.len() != x.nrows() {
                return Err(EstimatorError::ShapeMismatch {
                    expected: format!("{} targets", x.nrows()),
                    got: format!("{} targets", y.len()),
                });
            }
        }
        for (i, row) in x.rows().into_iter().enumerate() {
            estimator.update(&row_to_observation(row), y.map(|y| &y[i]))?;
        }
        Ok(())
    }
}

impl BatchEstimator for BatchAdapter {
    fn fit(&mut self, x: &Array2<f64>, y: Option<&[Target]>) -> Result<&mut Self> {
        let mut estimator = self.template.clone();
        Self::replay(estimator.as_mut(), x, y)?;
        info!(
            estimator = %estimator.name(),
            rows = x.nrows(),
            cols = x.ncols(),
            "fitted batch adapter"
        );
        self.fitted = Some(estimator);
        self.n_features_in = Some(x.ncols());
        Ok(self)
    }

    fn partial_fit(&mut self, x: &Array2<f64>, y: Option<&[Target]>) -> Result<&mut Self> {
        self.check_width(x)?;
        // Work on a copy so a failing row leaves the previous state intact
        let mut estimator = match &self.fitted {
            Some(fitted) => fitted.clone(),
            None => self.template.clone(),
        };
        Self::replay(estimator.as_mut(), x, y)?;
        self.fitted = Some(estimator);
        self.n_features_in = Some(x.ncols());
        Ok(self)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Prediction>> {
        let estimator = self.fitted()?;
        self.check_width(x)?;
        x.rows()
            .into_iter()
            .map(|row| estimator.predict(&row_to_observation(row)))
            .collect()
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let estimator = self.fitted()?;
        self.check_width(x)?;
        let outputs = x
            .rows()
            .into_iter()
            .map(|row| estimator.transform(&row_to_observation(row)))
            .collect::<Result<Vec<_>>>()?;
        observations_to_matrix(&outputs)
    }

    fn role(&self) -> Role {
        self.template.role()
    }

    fn name(&self) -> String {
        self.template.name()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.n_features_in
    }
}

fn row_to_observation(row: ArrayView1<'_, f64>) -> Observation {
    Observation::from_numeric(row.iter().enumerate().map(|(j, v)| (feature_name(j), *v)))
}

/// Lay observations out as rows, columns in the sorted key order of the first.
fn observations_to_matrix(outputs: &[Observation]) -> Result<Array2<f64>> {
    let columns: Vec<&String> = match outputs.first() {
        Some(first) => first.keys().collect(),
        None => return Ok(Array2::zeros((0, 0))),
    };
    let mut matrix = Array2::zeros((outputs.len(), columns.len()));
    for (i, out) in outputs.iter().enumerate() {
        if out.len() != columns.len() || !out.keys().eq(columns.iter().copied()) {
            return Err(EstimatorError::ShapeMismatch {
                expected: format!("columns {:?}", columns),
                got: format!("columns {:?} in row {}", out.keys().collect::<Vec<_>>(), i),
            });
        }
        for (j, (key, value)) in out.iter().enumerate() {
            matrix[[i, j]] = match value {
                Value::Numeric(v) => *v,
                Value::Categorical(_) => {
                    return Err(EstimatorError::TypeMismatch {
                        feature: key.clone(),
                        expected: ValueKind::Numeric.to_string(),
                        got: ValueKind::Categorical.to_string(),
                    })
                }
            };
        }
    }
    Ok(matrix)
}
