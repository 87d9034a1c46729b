// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fan-out driver: chunk standard input across an array or a set of
//! scalar jobs, optionally chaining `--then` / `--else` / `--finally`
//! follow-on jobs.

use anyhow::{Context, Result};
use clap::Args;
use spl_adapters::RealSubmitter;
use spl_batch::{BatchOptions, RunRequest};
use spl_core::JobId;
use std::io::BufRead;
use std::path::PathBuf;

/// Read standard input line by line, keeping each line's trailing newline
/// (chunking and rendering downstream assume lines still carry it, so
/// chunks can be written back out byte-for-byte).
fn read_stdin_lines() -> std::io::Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut handle = stdin.lock();
    let mut lines = Vec::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        if handle.read_line(&mut buf)? == 0 {
            break;
        }
        lines.push(std::mem::take(&mut buf));
    }
    Ok(lines)
}

#[derive(Args)]
pub struct FanOutArgs {
    /// Command (and its fixed arguments) run once per chunk
    #[arg(trailing_var_arg = true, required = true)]
    command: Vec<String>,

    /// Lines of standard input per chunk (0 = one chunk with everything)
    #[arg(long = "linesPerJob", default_value_t = 0)]
    lines_per_job: usize,

    /// Output directory for rendered scripts and input chunks
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Prefix for every rendered file and job name
    #[arg(long, default_value = "")]
    prefix: String,

    /// Job IDs the initial wave should wait on (afterok)
    #[arg(long = "afterok", value_name = "ID")]
    afterok: Vec<JobId>,

    /// Memory request per job
    #[arg(long, default_value = "8G")]
    mem: String,

    /// CPUs per job
    #[arg(long, default_value_t = 1)]
    cpus: u32,

    /// Width to zero-pad the per-chunk counter to
    #[arg(long, default_value_t = 5)]
    digits: usize,

    /// Time limit per job
    #[arg(long = "timePerJob", default_value = "10:00")]
    time_per_job: String,

    /// Partition to submit into
    #[arg(long, default_value = "medium")]
    partition: String,

    /// Command chained sequentially after the initial wave succeeds (repeatable)
    #[arg(long = "then", value_name = "COMMAND")]
    then: Vec<String>,

    /// Command fanned out when the initial wave fails (repeatable)
    #[arg(long = "else", value_name = "COMMAND")]
    r#else: Vec<String>,

    /// Command run regardless of the initial/else outcome (repeatable)
    #[arg(long = "finally", value_name = "COMMAND")]
    finally: Vec<String>,

    /// Prefix for rendered job names
    #[arg(long = "jobNamePrefix", default_value = "")]
    job_name_prefix: String,

    /// Render scripts to disk without submitting them
    #[arg(long = "dryRun")]
    dry_run: bool,

    /// Submit one script per chunk instead of a job array
    #[arg(long = "noArray")]
    no_array: bool,

    /// Cap on simultaneously running array elements
    #[arg(long = "arrayMax")]
    array_max: Option<u32>,

    /// Do not delete input chunk files after a job completes
    #[arg(long = "keepInputs")]
    keep_inputs: bool,

    /// Do not delete empty stderr files
    #[arg(long = "keepErrorFiles")]
    keep_error_files: bool,

    /// Do not delete empty workload-manager log files
    #[arg(long = "keepSlurmFiles")]
    keep_slurm_files: bool,

    /// Touch a `.done` marker file after each job completes
    #[arg(long = "makeDoneFiles")]
    make_done_files: bool,

    /// Embed each chunk's input as a here-document (scalar mode only)
    #[arg(long)]
    inline: bool,

    /// Treat the first input line as a header repeated atop every chunk
    #[arg(long)]
    header: bool,

    /// Suppress the JSON job-ID summary on stdout
    #[arg(long = "noJobIds")]
    no_job_ids: bool,

    /// Write chunk input files uncompressed
    #[arg(long)]
    uncompressed: bool,

    /// Seconds: each job sleeps 1..=N seconds before starting
    #[arg(long = "randomSleep")]
    random_sleep: Option<u32>,

    /// zstd compression level
    #[arg(long = "compressLevel", default_value_t = 9, value_parser = clap::value_parser!(i32).range(1..=9))]
    compress_level: i32,

    /// Emit progress to stderr
    #[arg(long)]
    verbose: bool,
}

pub async fn run(args: FanOutArgs) -> Result<()> {
    let options = BatchOptions {
        dir: args.dir,
        prefix: args.prefix,
        lines_per_job: args.lines_per_job,
        mem: args.mem,
        cpus: args.cpus,
        digits: args.digits,
        time_per_job: args.time_per_job,
        partition: args.partition,
        job_name_prefix: args.job_name_prefix,
        dry_run: args.dry_run,
        array: !args.no_array,
        array_max: args.array_max,
        remove_inputs: !args.keep_inputs,
        keep_error_files: args.keep_error_files,
        keep_slurm_files: args.keep_slurm_files,
        make_done_files: args.make_done_files,
        inline: args.inline,
        header: args.header,
        print_job_ids: !args.no_job_ids,
        uncompressed: args.uncompressed,
        random_sleep: args.random_sleep,
        compress_level: args.compress_level,
        verbose: args.verbose,
    };

    let request = RunRequest {
        command: &args.command,
        then_commands: &args.then,
        else_commands: &args.r#else,
        finally_commands: &args.finally,
        afterok: &args.afterok,
    };

    let lines = read_stdin_lines().context("reading standard input")?.into_iter();

    let submitter = RealSubmitter::default();
    let summary = spl_batch::run(request, lines, &options, &submitter).await?;

    if options.print_job_ids {
        println!("{}", serde_json::to_string(&summary).context("serializing job-ID summary")?);
    }

    Ok(())
}
