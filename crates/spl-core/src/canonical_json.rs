// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical JSON rendering: sorted keys, two-space indent, sets as sorted
//! lists.
//!
//! `serde_json`'s default `Map` (built without the `preserve_order`
//! feature) is `BTreeMap`-backed, so object keys already come out sorted;
//! `BTreeSet`-typed fields (see [`crate::job::JobIdSet`]) serialize
//! pre-sorted too. That means `to_string_pretty` on our typed structs
//! already satisfies the canonical form — this function exists so callers
//! have one obvious place to produce it, and so the two-space indent stays
//! consistent everywhere it's written.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Render `value` as canonical JSON: sorted object keys, two-space indent,
/// a trailing newline.
#[allow(clippy::expect_used)]
pub fn to_canonical_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8(buf).expect("serde_json only emits valid UTF-8"))
}

#[cfg(test)]
#[path = "canonical_json_tests.rs"]
mod tests;
