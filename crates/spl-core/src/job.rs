// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload-manager job identifiers.

use std::collections::BTreeSet;

/// A workload-manager-level unit of work, identified by an integer ID.
///
/// Job IDs are bare integers assigned by the cluster's workload manager —
/// they participate in arithmetic-looking contexts
/// (`--dependency=afterok:123`) and sorted sets, so a numeric type alias is
/// the right fit here rather than a string-newtype wrapper.
pub type JobId = u64;

/// An ordered set of job IDs, used for both `tasks` and `taskDependencies`
/// maps. `BTreeSet` keeps iteration (and therefore serialization) sorted
/// without an explicit sort-on-emit step.
pub type JobIdSet = BTreeSet<JobId>;
