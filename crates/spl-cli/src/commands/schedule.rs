// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler driver: load a specification, run it, write the status
//! document.

use anyhow::{Context, Result};
use clap::Args;
use spl_core::{JobId, ScheduleOptions};
use std::path::PathBuf;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to the pipeline specification (JSON or TOML)
    #[arg(long = "specification", value_name = "PATH")]
    specification: PathBuf,

    /// Set SP_FORCE=1 in every step's environment
    #[arg(long)]
    force: bool,

    /// Run steps before this one in skip mode
    #[arg(long = "firstStep", value_name = "NAME")]
    first_step: Option<String>,

    /// Run steps after this one in skip mode
    #[arg(long = "lastStep", value_name = "NAME")]
    last_step: Option<String>,

    /// Force this step into skip mode (repeatable)
    #[arg(long = "skip", value_name = "NAME")]
    skip: Vec<String>,

    /// Seconds to pause between consecutive step invocations
    #[arg(long, default_value_t = 0.0)]
    sleep: f64,

    /// Job IDs the initial steps' downstream jobs should follow
    #[arg(long = "startAfter", value_name = "ID")]
    start_after: Vec<JobId>,

    /// SP_NICE_ARG value, in [-10000, 10000]
    #[arg(long)]
    nice: Option<i32>,

    /// Where to write the status document (default: stdout)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Echo each step's captured stdout as it completes
    #[arg(long = "printOutput")]
    print_output: bool,

    /// Extra argv passed to steps with no declared dependencies (repeatable)
    #[arg(long = "scriptArgs", value_name = "ARG")]
    script_args: Vec<String>,
}

pub async fn run(args: ScheduleArgs) -> Result<()> {
    let specification = spl_runbook::load(&args.specification)
        .with_context(|| format!("loading {}", args.specification.display()))?;

    let options = ScheduleOptions {
        force: args.force,
        first_step: args.first_step,
        last_step: args.last_step,
        nice: args.nice,
        sleep: args.sleep,
        script_args: args.script_args,
        skip: args.skip,
        start_after: args.start_after,
    };

    let status = spl_engine::schedule(specification, options).await?;

    if args.print_output {
        for (name, step) in &status.specification.steps {
            if !step.stdout.is_empty() {
                println!("=== {name} ===\n{}", step.stdout);
            }
        }
    }

    let rendered = spl_core::to_canonical_json(&status).context("serializing status document")?;
    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}
