// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while building a status report or a collection view.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error(transparent)]
    Accounting(#[from] spl_accounting::AccountingError),

    #[error(
        "the specifications and names lists are not the same length ({specifications} != {names})"
    )]
    MismatchedLengths { specifications: usize, names: usize },

    #[error("the list of specification names contains at least one duplicate: {0:?}")]
    DuplicateName(String),

    #[error(
        "the list of steps found in the first specification {first:?} does not match \
         that found in specification number {index}: {found:?}"
    )]
    MismatchedSteps {
        first: Vec<String>,
        index: usize,
        found: Vec<String>,
    },
}
