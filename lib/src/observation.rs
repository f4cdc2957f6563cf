//! Observations, targets and predictions exchanged with estimators.
//!
//! An [`Observation`] is one row of streaming input: an ordered mapping from
//! feature name to [`Value`]. Estimators receive observations by shared
//! reference, so an observation cannot change once it has been handed over.

use crate::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single feature value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Continuous feature.
    Numeric(f64),
    /// Categorical feature.
    Categorical(String),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Numeric(_) => ValueKind::Numeric,
            Value::Categorical(_) => ValueKind::Categorical,
        }
    }

    /// The numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            Value::Categorical(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Numeric(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Categorical(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Categorical(v)
    }
}

/// Type tag of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Numeric => write!(f, "numeric"),
            ValueKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// One unit of streaming input: feature name to value.
///
/// Backed by a `BTreeMap`, so iteration order is the sorted feature order and
/// is identical between runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation(BTreeMap<String, Value>);

impl Observation {
    /// Create an empty observation.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build an observation from numeric features.
    pub fn from_numeric<K, I>(features: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self(
            features
                .into_iter()
                .map(|(k, v)| (k.into(), Value::Numeric(v)))
                .collect(),
        )
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert a feature, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Look up a feature.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether a feature is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the observation has no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over features in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Feature names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// All features as `(name, f64)` pairs.
    ///
    /// # Errors
    /// Returns [`EstimatorError::TypeMismatch`] on the first categorical feature.
    pub fn numeric_features(&self) -> Result<Vec<(&str, f64)>> {
        self.0
            .iter()
            .map(|(name, value)| match value {
                Value::Numeric(v) => Ok((name.as_str(), *v)),
                Value::Categorical(_) => Err(EstimatorError::TypeMismatch {
                    feature: name.clone(),
                    expected: ValueKind::Numeric.to_string(),
                    got: ValueKind::Categorical.to_string(),
                }),
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for Observation {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Observation {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Records the kind of every feature seen so far.
///
/// Estimators call [`Schema::observe`] at the start of `update`, which rejects
/// observations whose feature kinds disagree with earlier ones.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    kinds: BTreeMap<String, ValueKind>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `x` against known kinds and record new features.
    pub fn observe(&mut self, x: &Observation) -> Result<()> {
        self.validate(x)?;
        for (name, value) in x.iter() {
            self.kinds.entry(name.clone()).or_insert_with(|| value.kind());
        }
        Ok(())
    }

    /// Validate `x` against known kinds without recording anything.
    pub fn validate(&self, x: &Observation) -> Result<()> {
        for (name, value) in x.iter() {
            if let Some(expected) = self.kinds.get(name) {
                if *expected != value.kind() {
                    return Err(EstimatorError::TypeMismatch {
                        feature: name.clone(),
                        expected: expected.to_string(),
                        got: value.kind().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of distinct features seen.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// A class label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// Binary classification label.
    Bool(bool),
    /// Multiclass label.
    Class(i64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Bool(b) => write!(f, "{}", b),
            Label::Class(c) => write!(f, "{}", c),
        }
    }
}

/// Supervision signal passed to `update`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// Regression target.
    Real(f64),
    /// Classification target.
    Label(Label),
}

impl Target {
    /// Short description of the target kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Target::Real(_) => "real",
            Target::Label(Label::Bool(_)) => "binary label",
            Target::Label(Label::Class(_)) => "class label",
        }
    }

    /// Numeric view of the target: reals as-is, `true` as 1 and classes as their id.
    pub fn as_f64(&self) -> f64 {
        match self {
            Target::Real(v) => *v,
            Target::Label(Label::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Target::Label(Label::Class(c)) => *c as f64,
        }
    }

    /// The regression value.
    ///
    /// # Errors
    /// Returns [`EstimatorError::TypeMismatch`] for label targets.
    pub fn real(&self) -> Result<f64> {
        match self {
            Target::Real(v) => Ok(*v),
            other => Err(target_mismatch("real", other)),
        }
    }

    /// The binary label.
    ///
    /// # Errors
    /// Returns [`EstimatorError::TypeMismatch`] for anything but `Label::Bool`.
    pub fn binary(&self) -> Result<bool> {
        match self {
            Target::Label(Label::Bool(b)) => Ok(*b),
            other => Err(target_mismatch("binary label", other)),
        }
    }

    /// Any class label.
    ///
    /// # Errors
    /// Returns [`EstimatorError::TypeMismatch`] for real targets.
    pub fn label(&self) -> Result<&Label> {
        match self {
            Target::Label(l) => Ok(l),
            other => Err(target_mismatch("label", other)),
        }
    }
}

fn target_mismatch(expected: &str, got: &Target) -> EstimatorError {
    EstimatorError::TypeMismatch {
        feature: "target".to_string(),
        expected: expected.to_string(),
        got: got.kind_name().to_string(),
    }
}

impl From<f64> for Target {
    fn from(v: f64) -> Self {
        Target::Real(v)
    }
}

impl From<bool> for Target {
    fn from(v: bool) -> Self {
        Target::Label(Label::Bool(v))
    }
}

impl From<Label> for Target {
    fn from(v: Label) -> Self {
        Target::Label(v)
    }
}

/// Output of `predict`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Prediction {
    /// Regression output.
    Real(f64),
    /// Classification output.
    Label(Label),
    /// Cluster assignment.
    Cluster(usize),
}

impl Prediction {
    /// Numeric view used when laying predictions out in a batch column.
    pub fn as_f64(&self) -> f64 {
        match self {
            Prediction::Real(v) => *v,
            Prediction::Label(l) => Target::Label(l.clone()).as_f64(),
            Prediction::Cluster(c) => *c as f64,
        }
    }
}
