// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specification validation errors.

use thiserror::Error;

/// A structural or semantic defect in a pipeline specification.
///
/// Raised by the spec loader/validator (`spl-runbook`) and by the small
/// number of data-model invariants enforced directly in `spl-core`.
#[derive(Debug, Error)]
pub enum BadSpec {
    #[error("the specification must be a JSON/TOML object")]
    NotAnObject,

    #[error("the specification must have a top-level 'steps' key")]
    MissingSteps,

    #[error("the 'steps' key must be a list")]
    StepsNotAList,

    #[error("step {index} is not an object")]
    StepNotAnObject { index: usize },

    #[error("step {index} does not have a 'name' key")]
    StepMissingName { index: usize },

    #[error("the 'name' key in step {index} is not a string")]
    StepNameNotAString { index: usize },

    #[error("step {index} ({name:?}) does not have a 'script' key")]
    StepMissingScript { index: usize, name: String },

    #[error("the 'script' key in step {index} ({name:?}) is not a string")]
    StepScriptNotAString { index: usize, name: String },

    #[error("the name {name:?} of step {index} was already used in an earlier step")]
    DuplicateStepName { index: usize, name: String },

    #[error("step {index} ({name:?}) is a 'collect' step but does not have any dependencies")]
    CollectWithoutDependencies { index: usize, name: String },

    #[error("step {index} ({name:?}) has a non-list 'dependencies' key")]
    DependenciesNotAList { index: usize, name: String },

    #[error("step {index} ({name:?}) depends on itself")]
    SelfDependency { index: usize, name: String },

    #[error(
        "step {index} ({name:?}) depends on a non-existent (or not-yet-defined) step: {dependency:?}"
    )]
    UnknownDependency {
        index: usize,
        name: String,
        dependency: String,
    },

    #[error("the 'skip' key must be a list")]
    SkipNotAList,

    #[error("the 'skip' key mentions a non-existent step, {0:?}")]
    UnknownSkipStep(String),

    #[error("the script {script:?} in step {index} does not exist")]
    ScriptMissing { index: usize, script: String },

    #[error("the script {script:?} in step {index} is not executable")]
    ScriptNotExecutable { index: usize, script: String },

    #[error("step {index} specifies a working directory ({cwd:?}) that does not exist")]
    CwdMissing { index: usize, cwd: String },

    #[error("a status specification (one that already has 'scheduledAt') was passed to the scheduler")]
    AlreadyScheduled,

    #[error("could not parse {path:?} as JSON ({json_error}) or TOML ({toml_error})")]
    UnparseableFile {
        path: String,
        json_error: String,
        toml_error: String,
    },

    #[error("could not read {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
