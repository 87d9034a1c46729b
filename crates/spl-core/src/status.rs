// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The status document: a specification augmented with scheduling metadata.

use crate::job::JobId;
use crate::specification::Specification;
use serde::{Deserialize, Serialize};

/// The options a caller passed to `schedule()`, recorded verbatim on the
/// status document so a later read of the status can show exactly how the
/// run was invoked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub force: bool,
    #[serde(default, rename = "firstStep", skip_serializing_if = "Option::is_none")]
    pub first_step: Option<String>,
    #[serde(default, rename = "lastStep", skip_serializing_if = "Option::is_none")]
    pub last_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice: Option<i32>,
    #[serde(default)]
    pub sleep: f64,
    #[serde(default, rename = "scriptArgs")]
    pub script_args: Vec<String>,
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default, rename = "startAfter")]
    pub start_after: Vec<JobId>,
}

impl ScheduleOptions {
    /// The names in `skip`, as a borrowed-string iterator for membership
    /// checks against step names.
    pub fn skip_set(&self) -> impl Iterator<Item = &str> {
        self.skip.iter().map(String::as_str)
    }
}

/// A specification after scheduling: the original document plus the
/// top-level fields spec.md §3 says a status document carries.
///
/// Iteration order of `specification.steps` equals the order of the
/// original step list (an invariant the caller must preserve; see
/// [`Specification`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDocument {
    #[serde(flatten)]
    pub specification: Specification,

    #[serde(rename = "scheduledAt")]
    pub scheduled_at: f64,
    pub user: String,
    #[serde(rename = "firstStep")]
    pub first_step: Option<String>,
    #[serde(rename = "lastStep")]
    pub last_step: Option<String>,
    pub force: bool,
    pub nice: Option<i32>,
    pub sleep: f64,
    #[serde(rename = "scriptArgs")]
    pub script_args: Vec<String>,
    /// The realized skip set passed to `schedule()` as the `skip` option.
    /// A specification's own top-level `skip` list, if present before
    /// scheduling, is validated (every name must exist) but is not itself
    /// folded into this set — it is overwritten here with whatever the
    /// caller actually requested.
    pub skip: Vec<String>,
    #[serde(rename = "startAfter")]
    pub start_after: Vec<JobId>,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
