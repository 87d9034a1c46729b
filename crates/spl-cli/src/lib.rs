// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared plumbing for the three `spl-*` binaries: the scheduler driver,
//! the fan-out driver, and the status driver.

pub mod commands;

/// The submitter's own exit status, if this error ultimately came from a
/// rejected submission (§7: "Submitter exit"); otherwise a generic failure.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(spl_adapters::SubmitError::NonZeroExit { status, .. }) =
            cause.downcast_ref::<spl_adapters::SubmitError>()
        {
            return status.unwrap_or(1);
        }
    }
    1
}

pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
