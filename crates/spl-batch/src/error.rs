// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from the fan-out batcher.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("--inline makes no sense unless you also use --noArray")]
    InlineRequiresScalarMode,

    #[error("{path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Submit(#[from] spl_adapters::SubmitError),
}
