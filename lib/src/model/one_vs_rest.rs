//! One-vs-rest reduction from multiclass to binary classification.

use crate::error::{EstimatorError, Result};
use crate::estimator::{require_target, Estimator, Role};
use crate::observation::{Label, Observation, Prediction, Target};
use std::collections::BTreeMap;

/// One binary classifier per class, each trained to separate its class from
/// all others.
///
/// A fresh copy of the template is created the first time a class is seen.
/// The predicted class is the one whose classifier gives the highest
/// probability of `true`.
///
/// # Example
/// ```
/// use streamlearn::estimator::{Estimator, Role};
/// use streamlearn::model::{LogisticRegression, OneVsRestClassifier};
///
/// let ovr = OneVsRestClassifier::new(LogisticRegression::new()).unwrap();
/// assert_eq!(ovr.role(), Role::MultiClassClassifier);
/// assert_eq!(ovr.name(), "OneVsRest(LogisticRegression)");
/// ```
#[derive(Clone, Debug)]
pub struct OneVsRestClassifier {
    template: Box<dyn Estimator>,
    classifiers: BTreeMap<Label, Box<dyn Estimator>>,
}

impl OneVsRestClassifier {
    /// Wrap a binary classifier.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] if `classifier` is not a
    /// binary classifier.
    pub fn new<E: Estimator + 'static>(classifier: E) -> Result<Self> {
        if classifier.role() != Role::BinaryClassifier {
            return Err(EstimatorError::InvalidParameter(format!(
                "OneVsRest needs a binary classifier, got {} ({})",
                classifier.name(),
                classifier.role()
            )));
        }
        Ok(Self {
            template: Box::new(classifier),
            classifiers: BTreeMap::new(),
        })
    }

    /// Number of classes seen so far.
    pub fn n_classes(&self) -> usize {
        self.classifiers.len()
    }

    /// Probability of `true` from one binary classifier.
    fn positive_score(classifier: &dyn Estimator, x: &Observation) -> Result<f64> {
        match classifier.predict_proba(x) {
            Ok(proba) => Ok(proba.get(&Label::Bool(true)).copied().unwrap_or(0.0)),
            Err(EstimatorError::UnsupportedOperation { .. }) => {
                match classifier.predict(x)? {
                    Prediction::Label(Label::Bool(true)) => Ok(1.0),
                    _ => Ok(0.0),
                }
            }
            Err(e) => Err(e),
        }
    }
}

impl Estimator for OneVsRestClassifier {
    fn name(&self) -> String {
        format!("OneVsRest({})", self.template.name())
    }

    fn role(&self) -> Role {
        Role::MultiClassClassifier
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        let label = require_target(self, y)?.label()?.clone();
        if !self.classifiers.contains_key(&label) {
            self.classifiers.insert(label.clone(), self.template.clone());
        }
        for (class, classifier) in self.classifiers.iter_mut() {
            classifier.update(x, Some(&Target::from(*class == label)))?;
        }
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        let proba = self.predict_proba(x)?;
        let mut best: Option<(&Label, f64)> = None;
        for (label, p) in &proba {
            if best.map_or(true, |(_, b)| *p > b) {
                best = Some((label, *p));
            }
        }
        best.map(|(label, _)| Prediction::Label(label.clone()))
            .ok_or_else(|| EstimatorError::NotFitted {
                estimator: self.name(),
            })
    }

    fn predict_proba(&self, x: &Observation) -> Result<BTreeMap<Label, f64>> {
        if self.classifiers.is_empty() {
            return Err(EstimatorError::NotFitted {
                estimator: self.name(),
            });
        }
        let mut scores = BTreeMap::new();
        for (label, classifier) in &self.classifiers {
            scores.insert(label.clone(), Self::positive_score(classifier.as_ref(), x)?);
        }

        let total: f64 = scores.values().sum();
        let n = scores.len() as f64;
        for p in scores.values_mut() {
            *p = if total > 0.0 { *p / total } else { 1.0 / n };
        }
        Ok(scores)
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GaussianNB, LogisticRegression, PAClassifier};

    fn obs(x: f64) -> Observation {
        Observation::from_numeric([("x", x)])
    }

    fn class(c: i64) -> Target {
        Target::Label(Label::Class(c))
    }

    #[test]
    fn test_one_vs_rest_requires_binary_template() {
        assert!(matches!(
            OneVsRestClassifier::new(GaussianNB::new()),
            Err(EstimatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_one_vs_rest_not_fitted() {
        let ovr = OneVsRestClassifier::new(PAClassifier::new()).unwrap();
        assert!(ovr.predict(&obs(1.0)).unwrap_err().is_not_fitted());
    }

    #[test]
    fn test_one_vs_rest_spawns_classifier_per_class() {
        let mut ovr = OneVsRestClassifier::new(LogisticRegression::new()).unwrap();
        for c in [0, 1, 2, 1] {
            ovr.update(&obs(c as f64), Some(&class(c))).unwrap();
        }
        assert_eq!(ovr.n_classes(), 3);
        let proba = ovr.predict_proba(&obs(1.0)).unwrap();
        assert!((proba.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_vs_rest_single_class() {
        let mut ovr = OneVsRestClassifier::new(LogisticRegression::new()).unwrap();
        ovr.update(&obs(1.0), Some(&class(4))).unwrap();
        assert_eq!(
            ovr.predict(&obs(-5.0)).unwrap(),
            Prediction::Label(Label::Class(4))
        );
    }

    #[test]
    fn test_one_vs_rest_learns_three_classes() {
        let mut ovr = OneVsRestClassifier::new(PAClassifier::new()).unwrap();
        let points = [(-1.0, 0), (0.0, 1), (1.0, 2)];
        for _ in 0..20 {
            for (x, c) in points {
                let x = Observation::from_numeric([("x", x), ("bias", 1.0), ("sq", x * x)]);
                ovr.update(&x, Some(&class(c))).unwrap();
            }
        }
        for (x, c) in points {
            let x = Observation::from_numeric([("x", x), ("bias", 1.0), ("sq", x * x)]);
            assert_eq!(ovr.predict(&x).unwrap(), Prediction::Label(Label::Class(c)));
        }
    }

    #[test]
    fn test_one_vs_rest_rejects_real_target() {
        let mut ovr = OneVsRestClassifier::new(PAClassifier::new()).unwrap();
        assert!(ovr.update(&obs(1.0), Some(&Target::Real(1.0))).is_err());
    }
}
