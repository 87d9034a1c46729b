// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A long-form table across one or many [`PipelineStatus`] runs, suitable
//! for aggregation and plotting.

use crate::elapsed::elapsed_to_seconds;
use crate::error::StatusError;
use crate::pipeline_status::PipelineStatus;
use spl_core::job::JobId;
use std::collections::HashSet;

/// One row of the collection's flat table: a single job, in a single
/// task, in a single step, in a single named run.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub step: String,
    pub task: String,
    pub job_id: JobId,
    pub status: String,
    pub node: String,
    pub elapsed: String,
    pub seconds: Option<i64>,
}

/// A long-form table over N [`PipelineStatus`] runs.
///
/// Every run must share the exact same (ordered) step list — this is what
/// makes rows across runs comparable — and every run must have a unique
/// name, whether supplied by the caller or defaulted to the run's
/// zero-based index.
pub struct SlurmPipelineStatusCollection {
    rows: Vec<Row>,
    non_empty_step_names: Vec<String>,
}

impl SlurmPipelineStatusCollection {
    /// Build a collection from `statuses`, naming each one with the
    /// corresponding entry of `names` (or, if `names` is `None`, the run's
    /// zero-based index as a string).
    pub fn new(
        statuses: Vec<PipelineStatus>,
        names: Option<Vec<String>>,
    ) -> Result<Self, StatusError> {
        let names = match names {
            Some(names) => {
                if names.len() != statuses.len() {
                    return Err(StatusError::MismatchedLengths {
                        specifications: statuses.len(),
                        names: names.len(),
                    });
                }
                names
            }
            None => (0..statuses.len()).map(|i| i.to_string()).collect(),
        };

        let mut seen_names = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen_names.insert(name.clone()) {
                return Err(StatusError::DuplicateName(name.clone()));
            }
        }

        let first_steps: Vec<String> = statuses
            .first()
            .map(|status| status.document().specification.steps.keys().cloned().collect())
            .unwrap_or_default();

        for (index, status) in statuses.iter().enumerate().skip(1) {
            let found: Vec<String> = status.document().specification.steps.keys().cloned().collect();
            if found != first_steps {
                return Err(StatusError::MismatchedSteps {
                    first: first_steps.clone(),
                    index,
                    found,
                });
            }
        }

        let mut rows = Vec::new();
        let mut non_empty: Vec<String> = Vec::new();
        let mut non_empty_seen = HashSet::new();

        for (status, name) in statuses.iter().zip(&names) {
            let document = status.document();
            let probe = status.probe();

            for (step_name, step) in &document.specification.steps {
                let mut task_names: Vec<&String> = step.tasks.keys().collect();
                task_names.sort();

                for task_name in task_names {
                    let mut ids: Vec<JobId> = step.tasks[task_name].iter().copied().collect();
                    ids.sort_unstable();

                    for job_id in ids {
                        let state = probe.state(job_id)?.to_string();
                        let node = probe.field(job_id, "Nodelist")?.unwrap_or_default().to_string();
                        let elapsed = probe.field(job_id, "Elapsed")?.unwrap_or_default().to_string();
                        let seconds = elapsed_to_seconds(&elapsed);

                        rows.push(Row {
                            name: name.clone(),
                            step: step_name.clone(),
                            task: task_name.clone(),
                            job_id,
                            status: state,
                            node,
                            elapsed,
                            seconds,
                        });

                        if non_empty_seen.insert(step_name.clone()) {
                            non_empty.push(step_name.clone());
                        }
                    }
                }
            }
        }

        // `non_empty` was built in whatever order runs and steps were
        // visited in; restore original step declaration order.
        let mut ordered_non_empty: Vec<String> = first_steps
            .into_iter()
            .filter(|name| non_empty.contains(name))
            .collect();
        ordered_non_empty.dedup();

        Ok(Self {
            rows,
            non_empty_step_names: ordered_non_empty,
        })
    }

    /// Every row of the flat table, in run-then-step-then-task-then-job
    /// order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Step names that contributed at least one row, in original step
    /// declaration order.
    pub fn non_empty_step_names(&self) -> &[String] {
        &self.non_empty_step_names
    }

    /// Write the flat table to `writer` as CSV, one row per job.
    ///
    /// `seconds` is left blank when the run's `elapsed` field could not be
    /// parsed into a duration.
    pub fn write_csv<W: std::io::Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "name,step,task,jobId,status,node,elapsed,seconds")?;
        for row in &self.rows {
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                csv_field(&row.name),
                csv_field(&row.step),
                csv_field(&row.task),
                row.job_id,
                csv_field(&row.status),
                csv_field(&row.node),
                csv_field(&row.elapsed),
                row.seconds.map(|s| s.to_string()).unwrap_or_default(),
            )?;
        }
        Ok(())
    }
}

/// Quote `field` if it contains a comma, quote, or newline; double any
/// embedded quotes. Plain fields pass through unquoted.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
