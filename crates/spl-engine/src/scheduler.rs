// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline scheduler (C4): walks a specification's steps in
//! declaration order, invoking the step runner (C3) for each and
//! composing the resulting status document.

use crate::error::ScheduleError;
use crate::runner::{self, Invocation};
use spl_core::job::JobIdSet;
use spl_core::{ScheduleOptions, Specification, StatusDocument};
use std::collections::{BTreeMap, HashSet};

const NICE_HIGHEST: i32 = -10000;
const NICE_LOWEST: i32 = 10000;

/// Schedule `spec`, running every step's script once per the rules in
/// §4.4, and return the resulting status document.
///
/// `spec` must not already be a status document (i.e. must not carry a
/// `scheduledAt`); the caller is expected to have loaded it through
/// `spl-runbook`, which enforces this.
pub async fn schedule(
    mut spec: Specification,
    options: ScheduleOptions,
) -> Result<StatusDocument, ScheduleError> {
    let step_order: Vec<String> = spec.steps.keys().cloned().collect();

    validate_options(&step_order, &options)?;

    let first_index = match &options.first_step {
        Some(name) => step_order.iter().position(|n| n == name).unwrap_or(0),
        None => 0,
    };
    let last_index = match &options.last_step {
        Some(name) => step_order
            .iter()
            .position(|n| n == name)
            .unwrap_or(step_order.len().saturating_sub(1)),
        None => step_order.len().saturating_sub(1),
    };

    let explicit_skip: HashSet<&str> = options.skip_set().collect();
    let sp_force = if options.force { "1" } else { "0" };
    let sp_nice_arg = match options.nice {
        Some(n) => format!("--nice={n}"),
        None => "--nice".to_string(),
    };
    let sp_original_args = quote_script_args(&options.script_args);

    let n_steps = step_order.len();
    tracing::info!(steps = n_steps, "scheduling pipeline");

    for (index, name) in step_order.iter().enumerate() {
        let out_of_window = index < first_index || index > last_index;
        let per_step_flag = spec.steps[name].skip;
        let skip_mode = out_of_window || explicit_skip.contains(name.as_str()) || per_step_flag;
        tracing::debug!(step = %name, skip = skip_mode, "traversing step");

        let dependencies = spec.steps[name].dependencies.clone();
        let is_collect = spec.steps[name].collect;
        let is_error_step = spec.steps[name].error_step;
        let (polarity, separator) = if is_error_step {
            ("afternotok", "?")
        } else {
            ("afterok", ",")
        };

        let task_dependencies = union_task_dependencies(&spec, &dependencies);

        let mut tasks: indexmap::IndexMap<String, JobIdSet> = indexmap::IndexMap::new();
        let mut last_stdout = String::new();
        let mut last_environ: BTreeMap<String, String> = BTreeMap::new();

        let common_env = |dependency_arg: Option<String>| -> BTreeMap<String, String> {
            let mut env = BTreeMap::new();
            env.insert("SP_FORCE".to_string(), sp_force.to_string());
            env.insert("SP_NICE_ARG".to_string(), sp_nice_arg.clone());
            env.insert("SP_ORIGINAL_ARGS".to_string(), sp_original_args.clone());
            env.insert(
                "SP_SKIP".to_string(),
                if skip_mode { "1" } else { "0" }.to_string(),
            );
            if let Some(arg) = dependency_arg {
                env.insert("SP_DEPENDENCY_ARG".to_string(), arg);
            }
            env
        };

        if !task_dependencies.is_empty() {
            if is_collect {
                let mut job_ids: Vec<u64> = task_dependencies
                    .values()
                    .flat_map(|ids| ids.iter().copied())
                    .collect();
                job_ids.sort_unstable();
                job_ids.dedup();
                let dependency_arg = format!(
                    "--dependency={}",
                    job_ids
                        .iter()
                        .map(|id| format!("{polarity}:{id}"))
                        .collect::<Vec<_>>()
                        .join(separator)
                );
                let env = common_env(Some(dependency_arg));

                let mut task_names: Vec<&String> = task_dependencies.keys().collect();
                task_names.sort();
                let argv: Vec<String> = task_names.into_iter().cloned().collect();

                let script = runner::resolved_script(&spec.steps[name].script, spec.steps[name].cwd.as_deref());
                let invocation = Invocation {
                    argv: &argv,
                    env: &env,
                    cwd: spec.steps[name].cwd.as_deref(),
                };
                let outcome = runner::run_step_script(name, &script, &invocation).await?;
                last_stdout = outcome.stdout;
                last_environ = env;
                merge_tasks(&mut tasks, outcome.tasks);
            } else {
                let mut task_names: Vec<&String> = task_dependencies.keys().collect();
                task_names.sort();

                for task_name in task_names {
                    let job_ids = &task_dependencies[task_name];
                    let dependency_arg = if job_ids.is_empty() {
                        None
                    } else {
                        let mut sorted_ids: Vec<u64> = job_ids.iter().copied().collect();
                        sorted_ids.sort_unstable();
                        Some(format!(
                            "--dependency={}",
                            sorted_ids
                                .iter()
                                .map(|id| format!("{polarity}:{id}"))
                                .collect::<Vec<_>>()
                                .join(separator)
                        ))
                    };
                    let env = common_env(dependency_arg);
                    let argv = vec![task_name.clone()];

                    let script = runner::resolved_script(&spec.steps[name].script, spec.steps[name].cwd.as_deref());
                    let invocation = Invocation {
                        argv: &argv,
                        env: &env,
                        cwd: spec.steps[name].cwd.as_deref(),
                    };
                    let outcome = runner::run_step_script(name, &script, &invocation).await?;
                    last_stdout = outcome.stdout;
                    last_environ = env;
                    merge_tasks(&mut tasks, outcome.tasks);
                }
            }
        } else {
            let dependency_arg = if !options.start_after.is_empty() {
                let mut sorted_ids = options.start_after.clone();
                sorted_ids.sort_unstable();
                Some(format!(
                    "--dependency={}",
                    sorted_ids
                        .iter()
                        .map(|id| format!("{polarity}:{id}"))
                        .collect::<Vec<_>>()
                        .join(separator)
                ))
            } else {
                None
            };
            let env = common_env(dependency_arg);

            let argv: Vec<String> = if spec.steps[name].dependencies.is_empty() {
                options.script_args.clone()
            } else {
                Vec::new()
            };

            let script = runner::resolved_script(&spec.steps[name].script, spec.steps[name].cwd.as_deref());
            let invocation = Invocation {
                argv: &argv,
                env: &env,
                cwd: spec.steps[name].cwd.as_deref(),
            };
            let outcome = runner::run_step_script(name, &script, &invocation).await?;
            last_stdout = outcome.stdout;
            last_environ = env;
            merge_tasks(&mut tasks, outcome.tasks);
        }

        #[allow(clippy::expect_used)]
        let step = spec.steps.get_mut(name).expect("step exists by construction");
        step.skip = skip_mode;
        step.task_dependencies = task_dependencies;
        for (task_name, ids) in tasks {
            step.tasks.entry(task_name).or_default().extend(ids);
        }
        step.stdout = last_stdout;
        step.environ = last_environ;
        step.scheduled_at = Some(now_seconds());

        if options.sleep > 0.0 && index < n_steps - 1 {
            tracing::debug!(seconds = options.sleep, "sleeping between steps");
            tokio::time::sleep(std::time::Duration::from_secs_f64(options.sleep)).await;
        }
    }

    tracing::info!("pipeline scheduled");
    let scheduled_at = spec
        .steps
        .values()
        .filter_map(|s| s.scheduled_at)
        .reduce(f64::min)
        .unwrap_or_else(now_seconds);

    Ok(StatusDocument {
        specification: spec,
        scheduled_at,
        user: current_user(),
        first_step: options.first_step.clone(),
        last_step: options.last_step.clone(),
        force: options.force,
        nice: options.nice,
        sleep: options.sleep,
        script_args: options.script_args.clone(),
        skip: options.skip.clone(),
        start_after: options.start_after.clone(),
    })
}

fn validate_options(step_order: &[String], options: &ScheduleOptions) -> Result<(), ScheduleError> {
    if let Some(first) = &options.first_step {
        if !step_order.contains(first) {
            return Err(ScheduleError::UnknownFirstStep(first.clone()));
        }
    }
    if let Some(last) = &options.last_step {
        if !step_order.contains(last) {
            return Err(ScheduleError::UnknownLastStep(last.clone()));
        }
    }
    if let (Some(first), Some(last)) = (&options.first_step, &options.last_step) {
        #[allow(clippy::unwrap_used)]
        let first_index = step_order.iter().position(|n| n == first).unwrap();
        #[allow(clippy::unwrap_used)]
        let last_index = step_order.iter().position(|n| n == last).unwrap();
        if last_index < first_index {
            return Err(ScheduleError::LastStepPrecedesFirstStep {
                first: first.clone(),
                last: last.clone(),
            });
        }
    }
    for name in &options.skip {
        if !step_order.contains(name) {
            return Err(ScheduleError::UnknownSkipStep(name.clone()));
        }
    }
    if let Some(nice) = options.nice {
        if !(NICE_HIGHEST..=NICE_LOWEST).contains(&nice) {
            return Err(ScheduleError::NiceOutOfRange(nice));
        }
    }
    for arg in &options.script_args {
        if arg.contains('\'') {
            return Err(ScheduleError::ScriptArgContainsSingleQuote(arg.clone()));
        }
    }
    Ok(())
}

/// Render `args` as `SP_ORIGINAL_ARGS`: single-quoted and space-joined.
/// Callers must have already rejected any arg containing a single quote
/// (see `validate_options`).
fn quote_script_args(args: &[String]) -> String {
    args.iter()
        .map(|a| format!("'{a}'"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn union_task_dependencies(
    spec: &Specification,
    dependencies: &[String],
) -> indexmap::IndexMap<String, JobIdSet> {
    let mut result: indexmap::IndexMap<String, JobIdSet> = indexmap::IndexMap::new();
    for dep in dependencies {
        if let Some(step) = spec.steps.get(dep) {
            for (task_name, ids) in &step.tasks {
                result.entry(task_name.clone()).or_default().extend(ids.iter().copied());
            }
        }
    }
    result
}

fn merge_tasks(into: &mut indexmap::IndexMap<String, JobIdSet>, from: indexmap::IndexMap<String, JobIdSet>) {
    for (task_name, ids) in from {
        into.entry(task_name).or_default().extend(ids);
    }
}

fn now_seconds() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
