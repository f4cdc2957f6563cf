//! Parallel union of transformers.
//!
//! Every member receives the same input observation. The outputs are merged
//! into one observation whose keys are namespaced by member name as
//! `"{member}__{key}"`, so two members emitting the same key never clobber
//! each other.

use std::collections::{BTreeMap, BTreeSet};

use crate::compose::nested_name;
use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Target};

/// Side-by-side combination of transformers (or of feature selectors).
#[derive(Debug, Clone)]
pub struct TransformerUnion {
    members: Vec<(String, Box<dyn Estimator>)>,
    role: Role,
}

impl TransformerUnion {
    /// Build a union from its members, named after `Estimator::name`.
    ///
    /// # Errors
    /// - [`EstimatorError::InvalidParameter`] for an empty member list.
    /// - [`EstimatorError::RoleConflict`] if members do not all share the same
    ///   transformer role.
    /// - [`EstimatorError::DuplicateMember`] if two members share a name.
    pub fn new(members: Vec<Box<dyn Estimator>>) -> Result<Self> {
        Self::from_named(members.into_iter().map(|m| (m.name(), m)).collect())
    }

    pub(crate) fn from_named(members: Vec<(String, Box<dyn Estimator>)>) -> Result<Self> {
        let mut members = members.into_iter();
        let (name, first) = members.next().ok_or_else(|| {
            EstimatorError::InvalidParameter("Cannot build an empty union".to_string())
        })?;
        if !first.role().is_transformer() {
            return Err(EstimatorError::RoleConflict {
                left: format!("{} ({})", first.name(), first.role()),
                right: "a transformer".to_string(),
            });
        }

        let mut union = Self {
            role: first.role(),
            members: vec![(name, first)],
        };
        for (name, member) in members {
            union = union.with_member(name, member)?;
        }
        Ok(union)
    }

    pub(crate) fn into_members(self) -> Vec<(String, Box<dyn Estimator>)> {
        self.members
    }

    /// Add a member under an explicit name.
    ///
    /// # Errors
    /// Same conditions as [`TransformerUnion::new`].
    pub fn with_member(mut self, name: impl Into<String>, member: Box<dyn Estimator>) -> Result<Self> {
        let name = name.into();
        if member.role() != self.role {
            return Err(EstimatorError::RoleConflict {
                left: format!("{} ({})", self.name(), self.role),
                right: format!("{} ({})", member.name(), member.role()),
            });
        }
        if self.members.iter().any(|(existing, _)| *existing == name) {
            return Err(EstimatorError::DuplicateMember { name });
        }
        self.members.push((name, member));
        Ok(self)
    }

    /// Add a member named after `Estimator::name`.
    pub fn plus<E: Estimator + 'static>(self, member: E) -> Result<Self> {
        let name = member.name();
        self.with_member(name, Box::new(member))
    }

    /// Names used to namespace member outputs.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Outputs of each member before namespacing, keyed by member name.
    pub fn transform_members(&self, x: &Observation) -> Result<BTreeMap<String, Observation>> {
        self.members
            .iter()
            .enumerate()
            .map(|(index, (name, member))| {
                member
                    .transform(x)
                    .map(|out| (name.clone(), out))
                    .map_err(|e| e.in_step(index, name.clone()))
            })
            .collect()
    }
}

impl Estimator for TransformerUnion {
    fn name(&self) -> String {
        self.members
            .iter()
            .map(|(_, m)| nested_name(m.as_ref()))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn role(&self) -> Role {
        self.role
    }

    fn update(&mut self, x: &Observation, y: Option<&Target>) -> Result<()> {
        for (index, (name, member)) in self.members.iter_mut().enumerate() {
            member
                .update(x, y)
                .map_err(|e| e.in_step(index, name.clone()))?;
        }
        Ok(())
    }

    fn transform(&self, x: &Observation) -> Result<Observation> {
        let mut merged = Observation::new();
        let mut seen = BTreeSet::new();
        for (index, (name, member)) in self.members.iter().enumerate() {
            let out = member
                .transform(x)
                .map_err(|e| e.in_step(index, name.clone()))?;
            for (key, value) in out {
                let key = format!("{}__{}", name, key);
                if !seen.insert(key.clone()) {
                    return Err(EstimatorError::KeyCollision { key });
                }
                merged.insert(key, value);
            }
        }
        Ok(merged)
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
