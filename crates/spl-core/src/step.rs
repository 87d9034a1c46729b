// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single node in the pipeline DAG.

use crate::job::JobIdSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One step of a pipeline specification.
///
/// The first seven fields are present on load; the rest are populated by
/// the scheduler (`spl-engine`) as the step is traversed. There are no
/// subclasses for collector / error / skip steps — those are plain boolean
/// fields on this single record type, per the "polymorphism over step
/// kinds" design note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub script: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collect: bool,

    #[serde(
        default,
        rename = "error step",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub error_step: bool,

    /// Effective skip flag. Before scheduling this reflects only the
    /// per-step `skip` key in the document; the scheduler overwrites it
    /// with the realized skip-mode decision (explicit skip ∪ out-of-window
    /// ∪ per-step flag) as part of `scheduledAt` stamping.
    #[serde(default)]
    pub skip: bool,

    /// Task name -> job IDs emitted by this step. Empty until scheduled.
    #[serde(default)]
    pub tasks: IndexMap<String, JobIdSet>,

    /// Union of `tasks` maps of all declared dependencies, keyed by task
    /// name. Empty until scheduled.
    #[serde(default, rename = "taskDependencies")]
    pub task_dependencies: IndexMap<String, JobIdSet>,

    /// Wall-clock time (Unix epoch seconds) this step's script returned.
    /// `None` until scheduled.
    #[serde(default, rename = "scheduledAt", skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<f64>,

    /// Verbatim captured standard output of the step script.
    #[serde(default)]
    pub stdout: String,

    /// Snapshot of the `SP_*` variables set in the child environment.
    #[serde(default)]
    pub environ: BTreeMap<String, String>,
}

impl Step {
    /// Construct a step as it appears freshly loaded, before scheduling.
    pub fn new(name: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            cwd: None,
            dependencies: Vec::new(),
            collect: false,
            error_step: false,
            skip: false,
            tasks: IndexMap::new(),
            task_dependencies: IndexMap::new(),
            scheduled_at: None,
            stdout: String::new(),
            environ: BTreeMap::new(),
        }
    }

    /// Resolve this step's script path relative to its `cwd`, when relative.
    pub fn resolved_script(&self) -> PathBuf {
        match &self.cwd {
            Some(cwd) if self.script.is_relative() => cwd.join(&self.script),
            _ => self.script.clone(),
        }
    }

    /// All job IDs this step has emitted, across all of its tasks.
    pub fn job_ids(&self) -> JobIdSet {
        self.tasks.values().flatten().copied().collect()
    }

    /// All job IDs this step is waiting on, across all of its task
    /// dependencies.
    pub fn dependent_job_ids(&self) -> JobIdSet {
        self.task_dependencies.values().flatten().copied().collect()
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
