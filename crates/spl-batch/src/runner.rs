// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates a fan-out run: chunk stdin, render and submit the initial
//! wave, then chain `then` / `else` / `finally` commands off it.

use crate::chunk::take_chunks;
use crate::error::BatchError;
use crate::naming::{file_prefix, Stage};
use crate::options::BatchOptions;
use crate::script::{array_script, scalar_script, InputClause};
use crate::summary::Summary;
use spl_adapters::Submitter;
use spl_core::job::JobId;
use std::path::Path;

/// The commands that make up one fan-out run, independent of chunking and
/// rendering options.
pub struct RunRequest<'a> {
    pub command: &'a [String],
    pub then_commands: &'a [String],
    pub else_commands: &'a [String],
    pub finally_commands: &'a [String],
    pub afterok: &'a [JobId],
}

pub async fn run(
    request: RunRequest<'_>,
    lines: impl Iterator<Item = String>,
    options: &BatchOptions,
    submitter: &dyn Submitter,
) -> Result<Summary, BatchError> {
    if options.inline && options.array {
        return Err(BatchError::InlineRequiresScalarMode);
    }

    crate::io::ensure_dir(&options.dir).map_err(|source| BatchError::Io {
        path: options.dir.clone(),
        source,
    })?;

    let mut lines = lines;
    let header = if options.header { lines.next() } else { None };
    let chunks = take_chunks(lines, options.lines_per_job, header.as_deref());

    tracing::info!(chunks = chunks.len(), array = options.array, "fanning out");

    let command = request.command.join(" ");
    let initial = if options.array {
        submit_array(&command, &chunks, header.as_deref(), options, request.afterok, submitter).await?
    } else {
        submit_scalar_chunks(&command, &chunks, header.as_deref(), options, request.afterok, submitter).await?
    };

    let mut pending = initial.clone();
    let mut then_ids = Vec::new();
    for (count, command) in request.then_commands.iter().enumerate() {
        if let Some(id) = submit_followon(command, count, options, Stage::Then, &pending, submitter).await? {
            pending = vec![id];
            then_ids.push(id);
        }
    }

    let mut else_ids = Vec::new();
    for (count, command) in request.else_commands.iter().enumerate() {
        if let Some(id) = submit_followon(command, count, options, Stage::Else, &pending, submitter).await? {
            else_ids.push(id);
        }
    }

    // Both the finally stage's dependency comment and its actual submission
    // use the union of the pending and else job IDs.
    let mut finally_after: Vec<JobId> = pending.iter().chain(&else_ids).copied().collect();
    finally_after.sort_unstable();
    finally_after.dedup();

    let mut finally_ids = Vec::new();
    for (count, command) in request.finally_commands.iter().enumerate() {
        if let Some(id) =
            submit_followon(command, count, options, Stage::Finally, &finally_after, submitter).await?
        {
            finally_ids.push(id);
        }
    }

    Ok(Summary {
        initial,
        then: then_ids,
        else_: else_ids,
        finally: finally_ids,
        all: Vec::new(),
    }
    .finalize())
}

async fn submit_array(
    command: &str,
    chunks: &[Vec<String>],
    header: Option<&str>,
    options: &BatchOptions,
    afterok: &[JobId],
    submitter: &dyn Submitter,
) -> Result<Vec<JobId>, BatchError> {
    let chunk_refs: Vec<&[String]> = chunks.iter().map(Vec::as_slice).collect();
    let n_files = crate::io::write_input_files(
        chunk_refs,
        |count| file_prefix(options, Stage::Initial, Some(count), false, false, 0),
        header,
        options.uncompressed,
        options.compress_level,
    )
    .map_err(|source| BatchError::Io {
        path: options.dir.clone(),
        source,
    })?;

    if n_files == 0 {
        return Ok(Vec::new());
    }

    let text = array_script(n_files, command, options, Stage::Initial, afterok, !options.uncompressed);
    let id = submit_script(&text, options, Stage::Initial, None, afterok, submitter).await?;
    Ok(id.into_iter().collect())
}

async fn submit_scalar_chunks(
    command: &str,
    chunks: &[Vec<String>],
    header: Option<&str>,
    options: &BatchOptions,
    afterok: &[JobId],
    submitter: &dyn Submitter,
) -> Result<Vec<JobId>, BatchError> {
    let mut job_ids = Vec::new();
    for (count, lines) in chunks.iter().enumerate() {
        let stdin = format!("{}{}", header.unwrap_or(""), lines.concat());

        let written_path;
        let clause = if stdin.is_empty() {
            InputClause::None
        } else if options.inline {
            InputClause::Inline(&stdin)
        } else {
            let prefix = file_prefix(options, Stage::Initial, Some(count), false, false, options.digits);
            written_path = crate::io::write_chunk_file(&prefix, &stdin, options.uncompressed, options.compress_level)
                .map_err(|source| BatchError::Io {
                    path: prefix.clone(),
                    source,
                })?;
            InputClause::File {
                path: &written_path,
                compressed: !options.uncompressed,
            }
        };

        let text = scalar_script(command, count, options, Stage::Initial, afterok, &clause);
        if let Some(id) = submit_script(&text, options, Stage::Initial, Some(count), afterok, submitter).await? {
            job_ids.push(id);
        }
    }
    Ok(job_ids)
}

async fn submit_followon(
    command: &str,
    count: usize,
    options: &BatchOptions,
    stage: Stage,
    after: &[JobId],
    submitter: &dyn Submitter,
) -> Result<Option<JobId>, BatchError> {
    let text = scalar_script(command, count, options, stage, after, &InputClause::None);
    submit_script(&text, options, stage, Some(count), after, submitter).await
}

async fn submit_script(
    text: &str,
    options: &BatchOptions,
    stage: Stage,
    count: Option<usize>,
    after: &[JobId],
    submitter: &dyn Submitter,
) -> Result<Option<JobId>, BatchError> {
    // The rendered `.sbatch`/`.sbatch-error` file is never named with the
    // `${SLURM_ARRAY_TASK_ID}` runtime substitution — that only appears
    // inside the script text itself, evaluated once per array element.
    let digits = if count.is_some() { options.digits } else { 0 };
    let prefix = file_prefix(options, stage, count, false, false, digits);

    if options.dry_run {
        write_script(text, &prefix)?;
        return Ok(None);
    }

    let dependency = if after.is_empty() {
        None
    } else {
        let ids: Vec<String> = after.iter().map(JobId::to_string).collect();
        Some(format!("{}:{}", stage.condition(), ids.join(":")))
    };

    match submitter.submit(text, dependency.as_deref()).await {
        Ok(job_id) => Ok(Some(job_id)),
        Err(err) => {
            tracing::error!(stage = stage.label(), error = %err, "submission failed, writing sidecar");
            let error_path = path_with_suffix(&prefix, ".sbatch-error");
            crate::io::write_sbatch_error(text, &error_path).map_err(|source| BatchError::Io {
                path: error_path,
                source,
            })?;
            Err(BatchError::from(err))
        }
    }
}

fn write_script(text: &str, prefix: &Path) -> Result<(), BatchError> {
    let path = path_with_suffix(prefix, ".sbatch");
    crate::io::write_sbatch_file(text, &path).map_err(|source| BatchError::Io { path, source })
}

fn path_with_suffix(prefix: &Path, suffix: &str) -> std::path::PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(suffix);
    std::path::PathBuf::from(s)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
