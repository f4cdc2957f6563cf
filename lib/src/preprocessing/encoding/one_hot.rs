//! One-hot encoding for categorical features.
//!
//! Each categorical feature `name = value` becomes a numeric indicator
//! `name_value = 1`. Categories seen during updates but absent from the
//! current observation are emitted as 0, so the output layout only grows.
//! Numeric features pass through unchanged.

use crate::error::Result;
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Schema, Target, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Incremental one-hot encoder.
///
/// The encoder records the kind of every feature it sees; an observation
/// that switches a feature from numeric to categorical (or back) is rejected
/// with `TypeMismatch`.
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    schema: Schema,
    categories: BTreeMap<String, BTreeSet<String>>,
    sparse: bool,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder that emits zeros for known categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// If true, only the active indicator is emitted for each feature.
    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    /// Categories learned for a feature.
    pub fn categories(&self, feature: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(feature)
    }
}

impl Estimator for OneHotEncoder {
    fn name(&self) -> String {
        "OneHotEncoder".to_string()
    }

    fn role(&self) -> Role {
        Role::Transformer
    }

    fn update(&mut self, x: &Observation, _y: Option<&Target>) -> Result<()> {
        self.schema.observe(x)?;
        for (name, value) in x.iter() {
            if let Value::Categorical(category) = value {
                self.categories
                    .entry(name.clone())
                    .or_default()
                    .insert(category.clone());
            }
        }
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        self.schema.validate(x)?;
        let mut out = Observation::new();

        if !self.sparse {
            for (name, categories) in &self.categories {
                for category in categories {
                    out.insert(format!("{}_{}", name, category), Value::Numeric(0.0));
                }
            }
        }

        for (name, value) in x.iter() {
            match value {
                Value::Categorical(category) => {
                    out.insert(format!("{}_{}", name, category), Value::Numeric(1.0));
                }
                Value::Numeric(v) => {
                    out.insert(name.clone(), Value::Numeric(*v));
                }
            }
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
    use crate::error::EstimatorError;

    #[test]
    fn test_one_hot_encodes_known_categories() {
        let mut encoder = OneHotEncoder::new();
        encoder
            .update(&Observation::new().with("color", "red"), None)
            .unwrap();
        encoder
            .update(&Observation::new().with("color", "blue"), None)
            .unwrap();

        let out = encoder
            .transform(&Observation::new().with("color", "red").with("size", 3.0))
            .unwrap();
        assert_eq!(out.get("color_red").unwrap().as_f64(), Some(1.0));
        assert_eq!(out.get("color_blue").unwrap().as_f64(), Some(0.0));
        assert_eq!(out.get("size").unwrap().as_f64(), Some(3.0));
        assert_eq!(encoder.categories("color").unwrap().len(), 2);
    }

    #[test]
    fn test_one_hot_sparse_output() {
        let mut encoder = OneHotEncoder::new().with_sparse(true);
        encoder
            .update(&Observation::new().with("color", "red"), None)
            .unwrap();
        let out = encoder
            .transform(&Observation::new().with("color", "green"))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("color_green").unwrap().as_f64(), Some(1.0));
    }

    #[test]
    fn test_one_hot_rejects_kind_change() {
        let mut encoder = OneHotEncoder::new();
        encoder
            .update(&Observation::new().with("color", "red"), None)
            .unwrap();
        let err = encoder
            .update(&Observation::new().with("color", 1.0), None)
            .unwrap_err();
        assert!(matches!(err, EstimatorError::TypeMismatch { .. }));
        assert!(encoder
            .transform(&Observation::new().with("color", 1.0))
            .is_err());
    }
}
