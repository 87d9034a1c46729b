// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invoking the accounting command and parsing its pipe-delimited table.

use spl_core::job::JobId;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use thiserror::Error;
use tokio::process::Command;

/// Fields requested from the accounting command when the caller does not
/// override them, either directly or via [`FIELD_NAMES_ENV_VAR`].
pub const DEFAULT_FIELD_NAMES: &[&str] = &["JobName", "State", "Elapsed", "Nodelist"];

/// Environment variable providing a comma-separated default field list.
pub const FIELD_NAMES_ENV_VAR: &str = "SP_STATUS_FIELD_NAMES";

/// Everything that can go wrong querying or reading back job accounting
/// data.
#[derive(Debug, Error)]
pub enum AccountingError {
    #[error("failed to run accounting command {command:?}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("accounting command {command:?} exited with status {status:?}: {stderr}")]
    NonZeroExit {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("job id {0} appears more than once in the accounting command's output")]
    DuplicateJobId(JobId),

    #[error("the accounting command's output did not mention requested job id(s): {0:?}")]
    MissingJobIds(Vec<JobId>),

    #[error("job id {0} was not found in this accounting probe")]
    UnknownJob(JobId),
}

/// One job's accounting fields, keyed by lowercased field name.
#[derive(Debug, Clone, Default)]
pub struct JobRecord {
    fields: BTreeMap<String, String>,
}

impl JobRecord {
    pub fn get(&self, field_name: &str) -> Option<&str> {
        self.fields.get(&field_name.to_lowercase()).map(String::as_str)
    }

    /// Build a record directly from already-lowercased field names. Used by
    /// downstream crates assembling accounting fixtures for their own
    /// tests.
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

/// A read-only snapshot of job state for a fixed set of job IDs, obtained
/// by invoking the accounting command once.
pub struct AccountingProbe {
    field_names: Vec<String>,
    jobs: BTreeMap<JobId, JobRecord>,
}

impl AccountingProbe {
    /// Query `command` (e.g. `sacct`) for `job_ids`, requesting
    /// `field_names` (defaulting to [`DEFAULT_FIELD_NAMES`], or the
    /// [`FIELD_NAMES_ENV_VAR`] environment variable if set and
    /// `field_names` is `None`).
    pub async fn query(
        command: &str,
        job_ids: &BTreeSet<JobId>,
        field_names: Option<Vec<String>>,
    ) -> Result<Self, AccountingError> {
        let field_names = field_names.unwrap_or_else(default_field_names);

        let ids = job_ids
            .iter()
            .map(JobId::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut cmd = Command::new(command);
        cmd.arg("-P")
            .arg("--format")
            .arg(format!("JobId,{}", field_names.join(",")))
            .arg("--jobs")
            .arg(ids);

        tracing::debug!(command, jobs = job_ids.len(), "querying accounting command");

        let output = cmd.output().await.map_err(|source| AccountingError::Launch {
            command: command.to_string(),
            source,
        })?;

        if !output.status.success() {
            tracing::warn!(command, status = ?output.status.code(), "accounting command exited non-zero");
            return Err(AccountingError::NonZeroExit {
                command: command.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let jobs = parse_table(&stdout, &field_names)?;

        let missing: Vec<JobId> = job_ids
            .iter()
            .copied()
            .filter(|id| !jobs.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(AccountingError::MissingJobIds(missing));
        }

        Ok(Self { field_names, jobs })
    }

    /// Build a probe directly from already-parsed records, bypassing any
    /// subprocess. Used by tests and by callers that already have field
    /// data in hand.
    pub fn from_records(field_names: Vec<String>, jobs: BTreeMap<JobId, JobRecord>) -> Self {
        Self { field_names, jobs }
    }

    fn record(&self, job_id: JobId) -> Result<&JobRecord, AccountingError> {
        self.jobs
            .get(&job_id)
            .ok_or(AccountingError::UnknownJob(job_id))
    }

    /// A job is finished iff its state is neither `PENDING` nor `RUNNING`.
    pub fn finished(&self, job_id: JobId) -> Result<bool, AccountingError> {
        let state = self.state(job_id)?;
        Ok(state != "PENDING" && state != "RUNNING")
    }

    pub fn completed(&self, job_id: JobId) -> Result<bool, AccountingError> {
        Ok(self.state(job_id)? == "COMPLETED")
    }

    pub fn failed(&self, job_id: JobId) -> Result<bool, AccountingError> {
        Ok(self.state(job_id)? == "FAILED")
    }

    pub fn state(&self, job_id: JobId) -> Result<&str, AccountingError> {
        self.record(job_id)?
            .get("state")
            .ok_or(AccountingError::UnknownJob(job_id))
    }

    /// The raw value of one requested field, by its originally requested
    /// casing (e.g. `"Elapsed"`, `"Nodelist"`).
    pub fn field(&self, job_id: JobId, field_name: &str) -> Result<Option<&str>, AccountingError> {
        Ok(self.record(job_id)?.get(field_name))
    }

    /// Every job id this probe was built over.
    pub fn job_ids(&self) -> impl Iterator<Item = JobId> + '_ {
        self.jobs.keys().copied()
    }

    /// `Field=Value, …` in the originally requested field-name casing.
    pub fn summarize(&self, job_id: JobId) -> Result<String, AccountingError> {
        let record = self.record(job_id)?;
        Ok(self
            .field_names
            .iter()
            .map(|name| format!("{name}={}", record.get(name).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(", "))
    }
}

fn default_field_names() -> Vec<String> {
    match std::env::var(FIELD_NAMES_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => {
            value.split(',').map(|s| s.trim().to_string()).collect()
        }
        _ => DEFAULT_FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
    }
}

fn parse_table(
    output: &str,
    field_names: &[String],
) -> Result<BTreeMap<JobId, JobRecord>, AccountingError> {
    let field_names_lower: Vec<String> = field_names.iter().map(|f| f.to_lowercase()).collect();
    let mut jobs = BTreeMap::new();

    for (index, line) in output.lines().enumerate() {
        if index == 0 {
            continue;
        }
        if index == 1 && line.starts_with('-') {
            continue;
        }
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split('|');
        let Some(first) = fields.next() else {
            continue;
        };
        if first.contains('.') {
            continue;
        }
        let Ok(job_id) = first.parse::<JobId>() else {
            continue;
        };
        if jobs.contains_key(&job_id) {
            return Err(AccountingError::DuplicateJobId(job_id));
        }

        let mut record = JobRecord::default();
        for (name, value) in field_names_lower.iter().zip(fields) {
            record.fields.insert(name.clone(), value.to_string());
        }
        jobs.insert(job_id, record);
    }

    Ok(jobs)
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
