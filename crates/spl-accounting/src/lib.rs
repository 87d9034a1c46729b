// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spl-accounting: the read-only view of job state obtained from the
//! workload manager's accounting command.

mod probe;

pub use probe::{AccountingError, AccountingProbe, JobRecord, DEFAULT_FIELD_NAMES, FIELD_NAMES_ENV_VAR};
