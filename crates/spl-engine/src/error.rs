// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime errors from the step runner and the pipeline scheduler.

use thiserror::Error;

/// A runtime violation encountered while scheduling a pipeline: an invalid
/// option combination, a step script that misbehaved, or a malformed
/// `TASK:` line.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("firstStep {0:?} does not name a step in this specification")]
    UnknownFirstStep(String),

    #[error("lastStep {0:?} does not name a step in this specification")]
    UnknownLastStep(String),

    #[error("lastStep {last:?} precedes firstStep {first:?}")]
    LastStepPrecedesFirstStep { first: String, last: String },

    #[error("skip option names a step that does not exist: {0:?}")]
    UnknownSkipStep(String),

    #[error("nice value {0} is out of range [-10000, 10000]")]
    NiceOutOfRange(i32),

    #[error("script argument {0:?} contains a single quote, which cannot be exported safely")]
    ScriptArgContainsSingleQuote(String),

    #[error(
        "step {step:?} exited with status {status:?} running {command:?}\nstdout: {stdout}\nstderr: {stderr}"
    )]
    ScriptFailed {
        step: String,
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("step {step:?} failed to launch {command:?}: {source}")]
    LaunchFailed {
        step: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("step {step:?} script {script:?} emitted a malformed TASK line: {line:?}")]
    MalformedTaskLine {
        step: String,
        script: String,
        line: String,
    },

    #[error("step {step:?} script {script:?} emitted a duplicate job id {job_id} on one TASK line: {line:?}")]
    DuplicateJobIdOnLine {
        step: String,
        script: String,
        job_id: u64,
        line: String,
    },

    #[error(transparent)]
    BadSpec(#[from] spl_core::error::BadSpec),
}
