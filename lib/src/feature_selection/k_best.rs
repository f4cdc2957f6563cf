//! Supervised selection of the k features most similar to the target.

use crate::error::{EstimatorError, Result};
use crate::estimator::{require_target, Estimator, Role};
use crate::observation::{Observation, Target, Value};
use crate::stats::Bivariate;
use std::collections::{BTreeMap, BTreeSet};

/// Keeps the `k` features with the highest running similarity to the target.
///
/// The similarity is any [`Bivariate`] statistic, updated with
/// `(feature value, target as f64)` pairs. Ties are broken by feature name.
///
/// # Example
/// ```
/// use streamlearn::estimator::Estimator;
/// use streamlearn::feature_selection::SelectKBest;
/// use streamlearn::observation::{Observation, Target};
/// use streamlearn::stats::PearsonCorrelation;
///
/// let mut selector = SelectKBest::new(PearsonCorrelation::new(), 1);
/// for i in 0..10 {
///     let v = i as f64;
///     let x = Observation::from_numeric([("signal", v), ("noise", (v * 7.0) % 3.0)]);
///     selector.update(&x, Some(&Target::Real(2.0 * v))).unwrap();
/// }
/// let out = selector
///     .transform(&Observation::from_numeric([("signal", 1.0), ("noise", 1.0)]))
///     .unwrap();
/// assert_eq!(out.keys().collect::<Vec<_>>(), vec!["signal"]);
/// ```
#[derive(Clone, Debug)]
pub struct SelectKBest<S: Bivariate + 'static> {
    similarity: S,
    k: usize,
    scores: BTreeMap<String, S>,
}

impl<S: Bivariate + 'static> SelectKBest<S> {
    pub fn new(similarity: S, k: usize) -> Self {
        Self {
            similarity,
            k,
            scores: BTreeMap::new(),
        }
    }

    /// Current similarity of every feature seen so far.
    pub fn scores(&self) -> BTreeMap<&str, f64> {
        self.scores
            .iter()
            .map(|(name, stat)| (name.as_str(), stat.get()))
            .collect()
    }

    /// Names of the currently selected features, best first.
    pub fn leaderboard(&self) -> Vec<&str> {
        let mut ranked: Vec<(&str, f64)> = self
            .scores
            .iter()
            .map(|(name, stat)| (name.as_str(), stat.get()))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().take(self.k).map(|(name, _)| name).collect()
    }
}

impl<S: Bivariate + 'static> Estimator for SelectKBest<S> {
    fn name(&self) -> String {
        "SelectKBest".to_string()
    }

    fn role(&self) -> Role {
        Role::FeatureSelector
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let y = require_target(self, y)?.as_f64();
        for (name, value) in x.numeric_features()? {
            self.scores
                .entry(name.to_string())
                .or_insert_with(|| self.similarity.clone())
                .update(value, y);
        }
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        if self.scores.is_empty() {
            return Err(EstimatorError::NotFitted {
                estimator: self.name(),
            });
        }
        let best: BTreeSet<&str> = self.leaderboard().into_iter().collect();
        Ok(x.numeric_features()?
            .into_iter()
            .filter(|(name, _)| best.contains(name))
            .map(|(name, value)| (name.to_string(), Value::Numeric(value)))
            .collect())
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Covariance, PearsonCorrelation};

    #[test]
    fn test_select_k_best_not_fitted() {
        let selector = SelectKBest::new(PearsonCorrelation::new(), 2);
        let err = selector
            .transform(&Observation::from_numeric([("a", 1.0)]))
            .unwrap_err();
        assert!(err.is_not_fitted());
    }

    #[test]
    fn test_select_k_best_requires_target() {
        let mut selector = SelectKBest::new(PearsonCorrelation::new(), 2);
        assert!(matches!(
            selector.update(&Observation::from_numeric([("a", 1.0)]), None),
            Err(EstimatorError::MissingTarget { .. })
        ));
    }

    #[test]
    fn test_select_k_best_ranks_by_similarity() {
        let mut selector = SelectKBest::new(Covariance::new(1), 2);
        for i in 0..5 {
            let v = i as f64;
            let x = Observation::from_numeric([("a", v), ("b", 3.0 * v), ("c", -v)]);
            selector.update(&x, Some(&Target::Real(v))).unwrap();
        }
        assert_eq!(selector.leaderboard(), vec!["b", "a"]);
        let out = selector
            .transform(&Observation::from_numeric([("a", 1.0), ("b", 1.0), ("c", 1.0)]))
            .unwrap();
        assert!(!out.contains("c"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_select_k_best_ties_broken_by_name() {
        let mut selector = SelectKBest::new(PearsonCorrelation::new(), 1);
        for i in 0..4 {
            let v = i as f64;
            let x = Observation::from_numeric([("z", v), ("m", v)]);
            selector.update(&x, Some(&Target::from(i % 2 == 0))).unwrap();
        }
        assert_eq!(selector.leaderboard(), vec!["m"]);
    }

    #[test]
    fn test_select_k_best_k_larger_than_features() {
        let mut selector = SelectKBest::new(PearsonCorrelation::new(), 10);
        selector
            .update(&Observation::from_numeric([("a", 1.0)]), Some(&Target::Real(1.0)))
            .unwrap();
        assert_eq!(selector.leaderboard(), vec!["a"]);
    }
}
