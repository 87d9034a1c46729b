// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The submission side of the workload-manager contract (§6): a command
//! that accepts a rendered script on stdin and a dependency string, and
//! prints a line whose fourth whitespace-delimited token is the new job's
//! numeric ID.

use async_trait::async_trait;
use spl_core::JobId;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Everything that can go wrong submitting a script.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to launch submitter: {0}")]
    Launch(String),

    #[error("submitter exited with status {status:?}")]
    NonZeroExit {
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("could not find a job ID in the submitter's response: {response:?}")]
    UnparsableResponse { response: String },
}

/// Submit a rendered job script and report its new job ID.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit `script`, optionally specifying a `--dependency=` condition
    /// string (e.g. `afterok:10,afterok:11`). Returns the numeric job ID
    /// on success.
    async fn submit(&self, script: &str, dependency: Option<&str>) -> Result<JobId, SubmitError>;
}

/// Extract the job ID from a submitter's response line.
///
/// The fourth whitespace-delimited token of the first non-empty line is
/// taken to be the job ID (e.g. `Submitted batch job 777`). This is
/// fragile by nature — the workload manager owns the wording — so it is
/// isolated in one function with a single, well-tested responsibility.
pub fn parse_job_id(response: &str) -> Result<JobId, SubmitError> {
    let first_line = response.lines().find(|line| !line.trim().is_empty());
    let token = first_line.and_then(|line| line.split_whitespace().nth(3));
    token
        .and_then(|t| t.parse::<JobId>().ok())
        .ok_or_else(|| SubmitError::UnparsableResponse {
            response: response.to_string(),
        })
}

/// Submits scripts via a configurable workload-manager submission command
/// (`sbatch` by default).
pub struct RealSubmitter {
    command: String,
}

impl RealSubmitter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for RealSubmitter {
    fn default() -> Self {
        Self::new("sbatch")
    }
}

#[async_trait]
impl Submitter for RealSubmitter {
    async fn submit(&self, script: &str, dependency: Option<&str>) -> Result<JobId, SubmitError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("--kill-on-invalid-dep=yes");
        if let Some(dependency) = dependency {
            cmd.arg(format!("--dependency={dependency}"));
        }
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| SubmitError::Launch(e.to_string()))?;

        // The script is fed on stdin, never as an argument: the workload
        // manager contract (§6) reads the submission from stdin.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SubmitError::Launch("submitter has no stdin".to_string()))?;
        stdin
            .write_all(script.as_bytes())
            .await
            .map_err(|e| SubmitError::Launch(e.to_string()))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SubmitError::Launch(e.to_string()))?;

        if !output.status.success() {
            tracing::warn!(command = %self.command, status = ?output.status.code(), "submitter exited non-zero");
            return Err(SubmitError::NonZeroExit {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let job_id = parse_job_id(&String::from_utf8_lossy(&output.stdout))?;
        tracing::info!(job_id, "submitted job");
        Ok(job_id)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// One recorded call to [`FakeSubmitter::submit`].
    #[derive(Debug, Clone)]
    pub struct SubmitCall {
        pub script: String,
        pub dependency: Option<String>,
    }

    /// A submitter that never spawns a process: it hands out job IDs from
    /// a configured sequence and records every call it received.
    #[derive(Default)]
    pub struct FakeSubmitter {
        inner: Mutex<FakeSubmitterState>,
    }

    #[derive(Default)]
    struct FakeSubmitterState {
        calls: Vec<SubmitCall>,
        next_ids: std::collections::VecDeque<JobId>,
        next_error: Option<String>,
    }

    impl FakeSubmitter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the job IDs successive `submit()` calls will return.
        pub fn push_id(&self, id: JobId) {
            self.inner.lock().next_ids.push_back(id);
        }

        /// Make the next `submit()` call fail with a non-zero exit.
        pub fn fail_next(&self, stderr: impl Into<String>) {
            self.inner.lock().next_error = Some(stderr.into());
        }

        pub fn calls(&self) -> Vec<SubmitCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl Submitter for FakeSubmitter {
        async fn submit(
            &self,
            script: &str,
            dependency: Option<&str>,
        ) -> Result<JobId, SubmitError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SubmitCall {
                script: script.to_string(),
                dependency: dependency.map(str::to_string),
            });

            if let Some(stderr) = inner.next_error.take() {
                return Err(SubmitError::NonZeroExit {
                    status: Some(1),
                    stdout: String::new(),
                    stderr,
                });
            }

            inner
                .next_ids
                .pop_front()
                .ok_or_else(|| SubmitError::UnparsableResponse {
                    response: "FakeSubmitter has no queued job ID".to_string(),
                })
        }
    }
}

#[cfg(test)]
#[path = "submitter_tests.rs"]
mod tests;
