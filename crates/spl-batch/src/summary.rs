// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSON summary emitted on stdout after a run, for programmatic
//! chaining into tools like `jq`, `squeue`, or `scancel`.

use serde::Serialize;
use spl_core::job::JobId;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub initial: Vec<JobId>,
    pub then: Vec<JobId>,
    #[serde(rename = "else")]
    pub else_: Vec<JobId>,
    pub finally: Vec<JobId>,
    pub all: Vec<JobId>,
}

impl Summary {
    pub fn finalize(mut self) -> Self {
        self.all = self
            .initial
            .iter()
            .chain(&self.then)
            .chain(&self.else_)
            .chain(&self.finally)
            .copied()
            .collect();
        self
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
