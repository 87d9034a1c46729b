// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level pipeline specification document.

use crate::step::Step;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A pipeline specification: an ordered collection of steps plus an
/// optional top-level skip list.
///
/// The document's `steps` key is a JSON/TOML list on the wire (order
/// matters), but in memory we keep an [`IndexMap`] keyed by step name so
/// steps can be looked up directly while iteration order still equals
/// declaration order — never a plain `HashMap`, whose iteration order is
/// unspecified.
#[derive(Debug, Clone, Default)]
pub struct Specification {
    pub steps: IndexMap<String, Step>,
    pub skip: Vec<String>,
}

impl Specification {
    pub fn new(steps: IndexMap<String, Step>, skip: Vec<String>) -> Self {
        Self { steps, skip }
    }

    /// Build a specification from an ordered list of steps, keyed by name.
    /// Later duplicates overwrite earlier ones; callers that must reject
    /// duplicates should validate beforehand (see `spl-runbook`).
    pub fn from_steps(steps: Vec<Step>, skip: Vec<String>) -> Self {
        let mut map = IndexMap::with_capacity(steps.len());
        for step in steps {
            map.insert(step.name.clone(), step);
        }
        Self { steps: map, skip }
    }

    /// Find the steps on which nothing else depends — these must all
    /// finish before the specification as a whole has finished running.
    pub fn final_step_names(&self) -> Vec<&str> {
        let mut depended_on = std::collections::HashSet::new();
        for step in self.steps.values() {
            depended_on.extend(step.dependencies.iter().map(String::as_str));
        }
        self.steps
            .keys()
            .map(String::as_str)
            .filter(|name| !depended_on.contains(name))
            .collect()
    }
}

#[derive(Serialize, Deserialize)]
struct Wire {
    steps: Vec<Step>,
    #[serde(default)]
    skip: Vec<String>,
}

impl Serialize for Specification {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Wire {
            steps: self.steps.values().cloned().collect(),
            skip: self.skip.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Specification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = Wire::deserialize(deserializer)?;
        let mut steps = IndexMap::with_capacity(wire.steps.len());
        for step in wire.steps {
            if steps.contains_key(&step.name) {
                return Err(D::Error::custom(format!(
                    "duplicate step name {:?}",
                    step.name
                )));
            }
            steps.insert(step.name.clone(), step);
        }
        Ok(Specification {
            steps,
            skip: wire.skip,
        })
    }
}

#[cfg(test)]
#[path = "specification_tests.rs"]
mod tests;
