// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spl-adapters: process-execution adapters for the workload manager's two
//! external commands — submission and accounting.

pub mod submitter;

pub use submitter::{parse_job_id, RealSubmitter, SubmitError, Submitter};

#[cfg(any(test, feature = "test-support"))]
pub use submitter::fake::FakeSubmitter;
