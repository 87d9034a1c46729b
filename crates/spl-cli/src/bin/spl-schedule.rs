// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `spl-schedule` — schedule a declarative pipeline specification as a DAG
//! of cluster jobs.

use clap::Parser;
use spl::commands::schedule::{self, ScheduleArgs};

#[derive(Parser)]
#[command(name = "spl-schedule", version, about = "Schedule a pipeline specification as a DAG of cluster jobs")]
struct Cli {
    #[command(flatten)]
    args: ScheduleArgs,
}

#[tokio::main]
async fn main() {
    spl::init_logging();

    if let Err(err) = schedule::run(Cli::parse().args).await {
        eprintln!("Error: {err:#}");
        std::process::exit(spl::exit_code_for(&err));
    }
}
