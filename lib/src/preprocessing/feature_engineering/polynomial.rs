//! Polynomial feature generation.
//!
//! Generates polynomial and interaction features from the numeric features of
//! each observation. For an input `{a, b}` and degree 2 the output is
//! `{a, b, a*a, a*b, b*b}` (plus `bias` if requested).

use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Target, Value};

/// Stateless polynomial feature extender.
///
/// Output keys are the participating feature names joined by `*`, in sorted
/// order. The extender learns nothing, so `transform` works before any update.
///
/// # Example
/// ```
/// use streamlearn::estimator::Estimator;
/// use streamlearn::observation::Observation;
/// use streamlearn::preprocessing::PolynomialExtender;
///
/// let poly = PolynomialExtender::new();
/// let out = poly.transform(&Observation::from_numeric([("a", 2.0), ("b", 3.0)])).unwrap();
/// assert_eq!(out.get("a*b").unwrap().as_f64(), Some(6.0));
/// assert_eq!(out.len(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct PolynomialExtender {
    /// Maximum degree of polynomial features.
    degree: usize,
    /// If true, only produce products of distinct features.
    interaction_only: bool,
    /// If true, include a constant `bias` feature.
    include_bias: bool,
}

impl Default for PolynomialExtender {
    fn default() -> Self {
        Self::new()
    }
}

impl PolynomialExtender {
    /// Create a new extender with degree 2.
    pub fn new() -> Self {
        Self {
            degree: 2,
            interaction_only: false,
            include_bias: false,
        }
    }

    /// Set the maximum degree.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] for degree 0.
    pub fn with_degree(mut self, degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(EstimatorError::InvalidParameter(
                "PolynomialExtender degree must be at least 1".to_string(),
            ));
        }
        self.degree = degree;
        Ok(self)
    }

    /// Set whether to only produce interaction features.
    pub fn with_interaction_only(mut self, interaction_only: bool) -> Self {
        self.interaction_only = interaction_only;
        self
    }

    /// Set whether to include a bias feature.
    pub fn with_include_bias(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }
}

/// Index combinations (non-decreasing) for degrees 1..=degree.
fn polynomial_combinations(
    n_features: usize,
    degree: usize,
    interaction_only: bool,
) -> Vec<Vec<usize>> {
    let mut combinations = Vec::new();
    for d in 1..=degree {
        degree_combinations(n_features, d, interaction_only, &mut Vec::new(), &mut combinations);
    }
    combinations
}

fn degree_combinations(
    n_features: usize,
    remaining: usize,
    interaction_only: bool,
    current: &mut Vec<usize>,
    result: &mut Vec<Vec<usize>>,
) {
    if remaining == 0 {
        result.push(current.clone());
        return;
    }

    // Strictly increasing indices when interaction_only, non-decreasing otherwise
    let start = match current.last() {
        Some(&last) if interaction_only => last + 1,
        Some(&last) => last,
        None => 0,
    };

    for i in start..n_features {
        current.push(i);
        degree_combinations(n_features, remaining - 1, interaction_only, current, result);
        current.pop();
    }
}

impl Estimator for PolynomialExtender {
    fn name(&self) -> String {
        "PolynomialExtender".to_string()
    }

    fn role(&self) -> Role {
        Role::Transformer
    }

    fn update(&mut self, x: &Observation, _y: Option<&Target>) -> Result<()> {
        x.numeric_features()?;
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        let features = x.numeric_features()?;
        let mut out = Observation::new();

        if self.include_bias {
            out.insert("bias", Value::Numeric(1.0));
        }

        for combination in polynomial_combinations(features.len(), self.degree, self.interaction_only)
        {
            let name = combination
                .iter()
                .map(|&i| features[i].0)
                .collect::<Vec<_>>()
                .join("*");
            let value = combination.iter().map(|&i| features[i].1).product::<f64>();
            out.insert(name, Value::Numeric(value));
        }
        Ok(out)
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Observation {
        Observation::from_numeric([("a", 2.0), ("b", 3.0)])
    }

    #[test]
    fn test_polynomial_degree_2() {
        let out = PolynomialExtender::new().transform(&ab()).unwrap();
        let keys: Vec<&String> = out.keys().collect();
        assert_eq!(keys, vec!["a", "a*a", "a*b", "b", "b*b"]);
        assert_eq!(out.get("a*a").unwrap().as_f64(), Some(4.0));
        assert_eq!(out.get("b*b").unwrap().as_f64(), Some(9.0));
    }

    #[test]
    fn test_polynomial_interaction_only_with_bias() {
        let poly = PolynomialExtender::new()
            .with_interaction_only(true)
            .with_include_bias(true);
        let out = poly.transform(&ab()).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.get("bias").unwrap().as_f64(), Some(1.0));
        assert!(out.get("a*a").is_none());
    }

    #[test]
    fn test_polynomial_degree_3_count() {
        let poly = PolynomialExtender::new().with_degree(3).unwrap();
        let out = poly.transform(&ab()).unwrap();
        // 2 + 3 + 4 monomials
        assert_eq!(out.len(), 9);
        assert_eq!(out.get("a*a*b").unwrap().as_f64(), Some(12.0));
    }

    #[test]
    fn test_polynomial_invalid_degree() {
        assert!(PolynomialExtender::new().with_degree(0).is_err());
    }

    #[test]
    fn test_polynomial_works_before_update() {
        let poly = PolynomialExtender::new();
        assert!(poly.transform(&ab()).is_ok());
    }
}
