// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `spl-status` — report progress against a scheduled status document.

use clap::Parser;
use spl::commands::status::{self, StatusArgs};

#[derive(Parser)]
#[command(name = "spl-status", version, about = "Report progress against a status document")]
struct Cli {
    #[command(flatten)]
    args: StatusArgs,
}

#[tokio::main]
async fn main() {
    spl::init_logging();

    if let Err(err) = status::run(Cli::parse().args).await {
        eprintln!("Error: {err:#}");
        std::process::exit(spl::exit_code_for(&err));
    }
}
