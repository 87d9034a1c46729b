// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `spl-fanout` — chunk standard input and fan it out as cluster jobs.

use clap::Parser;
use spl::commands::fan_out::{self, FanOutArgs};

#[derive(Parser)]
#[command(name = "spl-fanout", version, about = "Chunk standard input and fan it out across cluster jobs")]
struct Cli {
    #[command(flatten)]
    args: FanOutArgs,
}

#[tokio::main]
async fn main() {
    spl::init_logging();

    if let Err(err) = fan_out::run(Cli::parse().args).await {
        eprintln!("Error: {err:#}");
        std::process::exit(spl::exit_code_for(&err));
    }
}
