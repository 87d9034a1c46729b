// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The step runner (C3): launches a step's script as a child process and
//! parses its `TASK:` announcements.

use crate::error::ScheduleError;
use indexmap::IndexMap;
use spl_core::job::{JobId, JobIdSet};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;

#[allow(clippy::expect_used)]
fn task_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^TASK:\s*(\S+)(.*)$").expect("static regex is valid"))
}

/// Everything a step invocation needs beyond the script path itself.
pub struct Invocation<'a> {
    pub argv: &'a [String],
    /// The `SP_*` variables to layer over the inherited environment.
    /// Only the variables that should be *set* appear here — a variable
    /// this invocation should leave unset (e.g. `SP_DEPENDENCY_ARG` with
    /// no upstream jobs) must simply be absent.
    pub env: &'a BTreeMap<String, String>,
    pub cwd: Option<&'a Path>,
}

/// What a single successful invocation produced.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub stdout: String,
    /// Task name -> job IDs, unioned across every `TASK:` line this
    /// invocation emitted.
    pub tasks: IndexMap<String, JobIdSet>,
}

/// Run `script` for `step_name` with the given [`Invocation`], parsing its
/// stdout for `TASK:` announcements.
pub async fn run_step_script(
    step_name: &str,
    script: &Path,
    invocation: &Invocation<'_>,
) -> Result<RunOutcome, ScheduleError> {
    let mut cmd = Command::new(script);
    cmd.args(invocation.argv);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    if let Some(cwd) = invocation.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in invocation.env {
        cmd.env(key, value);
    }

    let command_text = format!(
        "{} {}",
        script.display(),
        invocation.argv.join(" ")
    );

    tracing::debug!(step = step_name, command = %command_text, "invoking step script");

    let output = cmd.output().await.map_err(|source| ScheduleError::LaunchFailed {
        step: step_name.to_string(),
        command: command_text.clone(),
        source,
    })?;

    if !output.status.success() {
        tracing::error!(step = step_name, status = ?output.status.code(), "step script failed");
        return Err(ScheduleError::ScriptFailed {
            step: step_name.to_string(),
            command: command_text,
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let tasks = parse_task_lines(step_name, script, &stdout)?;

    Ok(RunOutcome { stdout, tasks })
}

fn parse_task_lines(
    step_name: &str,
    script: &Path,
    stdout: &str,
) -> Result<IndexMap<String, JobIdSet>, ScheduleError> {
    let mut tasks: IndexMap<String, JobIdSet> = IndexMap::new();

    for line in stdout.lines() {
        let Some(captures) = task_line_pattern().captures(line) else {
            continue;
        };

        let task_name = captures[1].to_string();
        let rest = captures[2].trim();

        let mut job_ids = JobIdSet::new();
        if !rest.is_empty() {
            for token in rest.split_whitespace() {
                let job_id: JobId = token.parse().map_err(|_| ScheduleError::MalformedTaskLine {
                    step: step_name.to_string(),
                    script: script.display().to_string(),
                    line: line.to_string(),
                })?;
                if !job_ids.insert(job_id) {
                    return Err(ScheduleError::DuplicateJobIdOnLine {
                        step: step_name.to_string(),
                        script: script.display().to_string(),
                        job_id,
                        line: line.to_string(),
                    });
                }
            }
        }

        tasks.entry(task_name).or_default().extend(job_ids);
    }

    Ok(tasks)
}

/// Absolute path to `script`, joined with `cwd` when `script` is relative.
pub fn resolved_script(script: &Path, cwd: Option<&Path>) -> PathBuf {
    match cwd {
        Some(cwd) if script.is_relative() => cwd.join(script),
        _ => script.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
