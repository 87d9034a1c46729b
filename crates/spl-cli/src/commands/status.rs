// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The status driver: read back a status document, reconcile it with the
//! accounting command, and report progress.

use anyhow::{Context, Result};
use clap::Args;
use spl_core::StatusDocument;
use spl_status::PipelineStatus;
use std::path::PathBuf;

/// The accounting command invoked to reconcile job state (`sacct`'s
/// conventional name; not user-configurable at this layer).
const ACCOUNTING_COMMAND: &str = "sacct";

#[derive(Args)]
pub struct StatusArgs {
    /// Path to a status document (a specification that has been scheduled)
    #[arg(long = "specification", value_name = "PATH")]
    specification: PathBuf,

    /// Comma-separated accounting field names to request (overrides
    /// SP_STATUS_FIELD_NAMES and the built-in default)
    #[arg(long = "fieldNames", value_name = "LIST")]
    field_names: Option<String>,

    /// Print only unfinished job IDs
    #[arg(long = "printUnfinished", conflicts_with_all = ["print_finished", "print_final"])]
    print_unfinished: bool,

    /// Print only finished job IDs
    #[arg(long = "printFinished", conflicts_with = "print_final")]
    print_finished: bool,

    /// Print only the job IDs nothing else depends on
    #[arg(long = "printFinal")]
    print_final: bool,
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.specification)
        .with_context(|| format!("reading {}", args.specification.display()))?;
    let document: StatusDocument = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid status document", args.specification.display()))?;

    let field_names = args
        .field_names
        .map(|list| list.split(',').map(|s| s.trim().to_string()).collect());

    let status = PipelineStatus::query(document, ACCOUNTING_COMMAND, field_names).await?;

    if args.print_unfinished {
        print_ids(status.unfinished_jobs()?);
    } else if args.print_finished {
        print_ids(status.finished_jobs()?);
    } else if args.print_final {
        print_ids(status.final_jobs());
    } else {
        print!("{}", status.to_report_string()?);
    }

    Ok(())
}

fn print_ids(ids: std::collections::BTreeSet<spl_core::JobId>) {
    let rendered: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    println!("{}", rendered.join(" "));
}
