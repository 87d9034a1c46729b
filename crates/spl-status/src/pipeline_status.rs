// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A status document paired with a live accounting probe over every job id
//! it mentions.

use crate::elapsed::seconds_to_time;
use crate::error::StatusError;
use spl_accounting::AccountingProbe;
use spl_core::job::JobIdSet;
use spl_core::status::StatusDocument;
use std::fmt::Write as _;

/// A scheduled pipeline plus the accounting state of every job it emitted.
pub struct PipelineStatus {
    document: StatusDocument,
    probe: AccountingProbe,
}

impl PipelineStatus {
    /// Query `command` (e.g. `sacct`) for every job this document mentions —
    /// the union of all step job ids and the `startAfter` job ids — and
    /// pair the result with `document`.
    pub async fn query(
        document: StatusDocument,
        command: &str,
        field_names: Option<Vec<String>>,
    ) -> Result<Self, StatusError> {
        let job_ids: std::collections::BTreeSet<_> = Self::all_job_ids(&document).into_iter().collect();
        tracing::debug!(jobs = job_ids.len(), "reconciling status document against accounting data");
        let probe = AccountingProbe::query(command, &job_ids, field_names).await?;
        Ok(Self { document, probe })
    }

    /// Build directly from an already-populated probe — used by tests and
    /// by callers that have already queried accounting data themselves.
    pub fn from_probe(document: StatusDocument, probe: AccountingProbe) -> Self {
        Self { document, probe }
    }

    pub fn document(&self) -> &StatusDocument {
        &self.document
    }

    pub fn probe(&self) -> &AccountingProbe {
        &self.probe
    }

    fn all_job_ids(document: &StatusDocument) -> JobIdSet {
        let mut ids = jobs_union(document);
        ids.extend(document.start_after.iter().copied());
        ids
    }

    /// Job ids emitted by the steps nothing else depends on.
    pub fn final_jobs(&self) -> JobIdSet {
        let final_steps = self.document.specification.final_step_names();
        let mut result = JobIdSet::new();
        for name in final_steps {
            if let Some(step) = self.document.specification.steps.get(name) {
                result.extend(step.job_ids());
            }
        }
        result
    }

    /// All job ids emitted by this specification, across every step.
    pub fn jobs(&self) -> JobIdSet {
        jobs_union(&self.document)
    }

    pub fn finished_jobs(&self) -> Result<JobIdSet, StatusError> {
        self.jobs_matching(|probe, id| probe.finished(id))
    }

    pub fn unfinished_jobs(&self) -> Result<JobIdSet, StatusError> {
        self.jobs_matching(|probe, id| probe.finished(id).map(|finished| !finished))
    }

    fn jobs_matching(
        &self,
        predicate: impl Fn(&AccountingProbe, spl_core::job::JobId) -> Result<bool, spl_accounting::AccountingError>,
    ) -> Result<JobIdSet, StatusError> {
        let mut result = JobIdSet::new();
        for id in self.jobs() {
            if predicate(&self.probe, id)? {
                result.insert(id);
            }
        }
        Ok(result)
    }

    pub fn step_job_ids(&self, step_name: &str) -> Option<JobIdSet> {
        self.document.specification.steps.get(step_name).map(|step| step.job_ids())
    }

    pub fn step_dependent_job_ids(&self, step_name: &str) -> Option<JobIdSet> {
        self.document
            .specification
            .steps
            .get(step_name)
            .map(|step| step.dependent_job_ids())
    }

    /// A fixed-order, human-readable report: header, steps summary, then
    /// per-step detail.
    pub fn to_report_string(&self) -> Result<String, StatusError> {
        let mut out = String::new();
        self.write_header(&mut out)?;
        self.write_steps_summary(&mut out)?;
        for (count, name) in self.document.specification.steps.keys().enumerate() {
            let _ = writeln!(out, "Step {}: {}", count + 1, name);
            self.write_step_detail(&mut out, name)?;
        }
        Ok(out)
    }

    fn write_header(&self, out: &mut String) -> Result<(), StatusError> {
        let doc = &self.document;
        let _ = writeln!(out, "Scheduled by: {}", doc.user);
        let _ = writeln!(out, "Scheduled at: {}", seconds_to_time(doc.scheduled_at));
        let _ = writeln!(out, "Scheduling arguments:");
        let _ = writeln!(out, "  First step: {}", doc.first_step.as_deref().unwrap_or("None"));
        let _ = writeln!(out, "  Force: {}", title_case_bool(doc.force));
        let _ = writeln!(out, "  Last step: {}", doc.last_step.as_deref().unwrap_or("None"));
        match doc.nice {
            Some(nice) => {
                let _ = writeln!(out, "  Nice: {nice}");
            }
            None => {
                let _ = writeln!(out, "  Nice: <None>");
            }
        }
        let _ = writeln!(out, "  Sleep: {:.2}", doc.sleep);

        if doc.script_args.is_empty() {
            let _ = writeln!(out, "  Script arguments: <None>");
        } else {
            let _ = writeln!(out, "  Script arguments: {}", doc.script_args.join(" "));
        }

        if doc.skip.is_empty() {
            let _ = writeln!(out, "  Skip: <None>");
        } else {
            let _ = writeln!(out, "  Skip: {}", doc.skip.join(", "));
        }

        if doc.start_after.is_empty() {
            let _ = writeln!(out, "  Start after: <None>");
        } else {
            let n = doc.start_after.len();
            let finished_count = doc
                .start_after
                .iter()
                .filter(|id| self.probe.finished(**id).unwrap_or(false))
                .count();
            let percent = finished_count as f64 / n as f64 * 100.0;
            let _ = writeln!(
                out,
                "  Start after the following {} job{}, of which {} ({:.2}%) {} finished:",
                n,
                if n == 1 { "" } else { "s" },
                finished_count,
                percent,
                if finished_count == 1 { "is" } else { "are" },
            );
            for id in &doc.start_after {
                let _ = writeln!(out, "    Job {}: {}", id, self.probe.summarize(*id)?);
            }
        }

        Ok(())
    }

    fn write_steps_summary(&self, out: &mut String) -> Result<(), StatusError> {
        let steps = &self.document.specification.steps;
        let mut total_emitted = 0usize;
        let mut total_finished = 0usize;
        let mut lines = Vec::with_capacity(steps.len());

        for (name, step) in steps {
            let job_ids = step.job_ids();
            let emitted = job_ids.len();
            let finished = job_ids
                .iter()
                .filter(|id| self.probe.finished(**id).unwrap_or(false))
                .count();
            total_emitted += emitted;
            total_finished += finished;

            if emitted == 0 {
                lines.push(format!("    {name}: no jobs emitted"));
            } else {
                let percent = finished as f64 / emitted as f64 * 100.0;
                lines.push(format!(
                    "    {}: {} job{} emitted, {} ({:.2}%) finished",
                    name,
                    emitted,
                    if emitted == 1 { "" } else { "s" },
                    finished,
                    percent,
                ));
            }
        }

        let percent = if total_emitted == 0 {
            100.0
        } else {
            total_finished as f64 / total_emitted as f64 * 100.0
        };

        let _ = writeln!(out, "Steps summary:");
        let _ = writeln!(out, "  Number of steps: {}", steps.len());
        let _ = writeln!(out, "  Jobs emitted in total: {total_emitted}");
        let _ = writeln!(out, "  Jobs finished: {total_finished} ({percent:.2}%)");
        for line in lines {
            let _ = writeln!(out, "{line}");
        }

        Ok(())
    }

    #[allow(clippy::expect_used)]
    fn write_step_detail(&self, out: &mut String, step_name: &str) -> Result<(), StatusError> {
        let step = self
            .document
            .specification
            .steps
            .get(step_name)
            .expect("step_name came from this document's own step list");

        let dependency_count = step.dependencies.len();
        if dependency_count > 0 {
            let _ = writeln!(
                out,
                "  {} step {}: {}",
                dependency_count,
                if dependency_count == 1 { "dependency" } else { "dependencies" },
                step.dependencies.join(", "),
            );

            let task_dependency_count = step.task_dependencies.len();
            let job_ids = step.dependent_job_ids();
            let job_ids_count = job_ids.len();
            let job_ids_finished_count = job_ids
                .iter()
                .filter(|id| self.probe.finished(**id).unwrap_or(false))
                .count();

            let _ = writeln!(
                out,
                "    Dependent on {} task{} emitted by the dependent step{}",
                task_dependency_count,
                if task_dependency_count == 1 { "" } else { "s" },
                if dependency_count == 1 { "" } else { "s" },
            );

            if job_ids_count > 0 {
                let percent = job_ids_finished_count as f64 / job_ids_count as f64 * 100.0;
                let _ = writeln!(
                    out,
                    "    Summary: {} job{} started by the dependent task{}, of which {} ({:.2}%) are finished",
                    job_ids_count,
                    if job_ids_count == 1 { "" } else { "s" },
                    if dependency_count == 1 { "" } else { "s" },
                    job_ids_finished_count,
                    percent,
                );
            } else if task_dependency_count > 0 {
                let _ = writeln!(
                    out,
                    "    Summary: 0 jobs started by the dependent task{}",
                    if task_dependency_count == 1 { "" } else { "s" },
                );
            }

            if task_dependency_count > 0 {
                let _ = writeln!(out, "    Dependent tasks:");
                let mut task_names: Vec<&String> = step.task_dependencies.keys().collect();
                task_names.sort();
                for task_name in task_names {
                    let _ = writeln!(out, "      {task_name}");
                    let mut ids: Vec<_> = step.task_dependencies[task_name].iter().copied().collect();
                    ids.sort_unstable();
                    for id in ids {
                        let _ = writeln!(out, "        Job {}: {}", id, self.probe.summarize(id)?);
                    }
                }
            }
        } else {
            let _ = writeln!(out, "  No dependencies.");
        }

        let task_count = step.tasks.len();
        if task_count > 0 {
            let _ = writeln!(
                out,
                "  {} task{} emitted by this step",
                task_count,
                if task_count == 1 { "" } else { "s" },
            );

            let job_ids = step.job_ids();
            let job_ids_count = job_ids.len();
            let job_ids_finished_count = job_ids
                .iter()
                .filter(|id| self.probe.finished(**id).unwrap_or(false))
                .count();

            if job_ids_count > 0 {
                let percent = job_ids_finished_count as f64 / job_ids_count as f64 * 100.0;
                let _ = writeln!(
                    out,
                    "    Summary: {} job{} started by {}, of which {} ({:.2}%) are finished",
                    job_ids_count,
                    if job_ids_count == 1 { "" } else { "s" },
                    if task_count == 1 { "this task" } else { "these tasks" },
                    job_ids_finished_count,
                    percent,
                );
            } else {
                let _ = writeln!(
                    out,
                    "    Summary: 0 jobs started by {}",
                    if task_count == 1 { "this task" } else { "these tasks" },
                );
            }

            let _ = writeln!(out, "    Tasks:");
            let mut task_names: Vec<&String> = step.tasks.keys().collect();
            task_names.sort();
            for task_name in task_names {
                let _ = writeln!(out, "      {task_name}");
                let mut ids: Vec<_> = step.tasks[task_name].iter().copied().collect();
                ids.sort_unstable();
                for id in ids {
                    let _ = writeln!(out, "        Job {}: {}", id, self.probe.summarize(id)?);
                }
            }
        } else {
            let _ = writeln!(out, "  No tasks emitted by this step");
        }

        let _ = writeln!(out, "  Collect step: {}", title_case_bool(step.collect));
        let _ = writeln!(out, "  Error step: {}", title_case_bool(step.error_step));
        let _ = writeln!(
            out,
            "  Working directory: {}",
            step.cwd.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| ".".to_string()),
        );
        let _ = writeln!(
            out,
            "  Scheduled at: {}",
            step.scheduled_at.map(seconds_to_time).unwrap_or_else(|| "<not scheduled>".to_string()),
        );
        let _ = writeln!(out, "  Script: {}", step.script.display());
        let _ = writeln!(out, "  Skip: {}", title_case_bool(step.skip));

        let _ = writeln!(out, "  Slurm pipeline environment variables:");
        for (var, value) in &step.environ {
            let _ = writeln!(out, "    {var}: {value}");
        }

        Ok(())
    }
}

/// Render a bool the way the report's header expects it (`True`/`False`,
/// not Rust's lowercase `Display`) — spec.md §8's round-trip scenario
/// checks the report text for the literal substring `Force: True`.
fn title_case_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Union of every step's emitted job ids.
fn jobs_union(document: &StatusDocument) -> JobIdSet {
    let mut result = JobIdSet::new();
    for step in document.specification.steps.values() {
        result.extend(step.job_ids());
    }
    result
}

#[cfg(test)]
#[path = "pipeline_status_tests.rs"]
mod tests;
