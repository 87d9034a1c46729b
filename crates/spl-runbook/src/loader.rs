// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning specification text (or a file on disk) into a validated
//! [`spl_core::Specification`].

use crate::checks::{check_scripts_exist, check_specification};
use spl_core::error::BadSpec;
use spl_core::Specification;
use std::path::Path;
use thiserror::Error;

/// Everything that can go wrong loading a specification file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    BadSpec(#[from] BadSpec),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load and fully validate the specification at `path`.
///
/// Tries JSON first, then TOML — matching the fallback a hand-written
/// specification file commonly relies on, since TOML is the friendlier
/// format to author by hand. A TOML document may use a top-level `step`
/// table-array name instead of `steps`; it is treated identically.
pub fn load(path: &Path) -> Result<Specification, LoadError> {
    tracing::debug!(path = %path.display(), "loading specification");
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text, path.display().to_string()).map_err(Into::into)
}

/// Parse and fully validate specification `text`.
///
/// `label` is used only in the error message produced when `text` is
/// neither valid JSON nor valid TOML.
pub fn parse(text: &str, label: impl Into<String>) -> Result<Specification, BadSpec> {
    let value = parse_as_value(text, label)?;
    from_value(value)
}

/// Validate and load an already-structured specification `value` — the "in-
/// memory object" input modality alongside [`load`]/[`parse`]'s file/text
/// path, for callers that built (or received) a `serde_json::Value`
/// directly instead of reading JSON or TOML off disk.
#[allow(clippy::expect_used)]
pub fn from_value(value: serde_json::Value) -> Result<Specification, BadSpec> {
    check_specification(&value)?;
    check_scripts_exist(&value)?;

    let specification: Specification =
        serde_json::from_value(value).expect("shape already validated");
    Ok(specification)
}

fn parse_as_value(text: &str, label: impl Into<String>) -> Result<serde_json::Value, BadSpec> {
    let json_error = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match toml::from_str::<toml::Value>(text) {
        Ok(toml_value) => {
            let mut value = toml_to_json(toml_value);
            normalize_toml_step_alias(&mut value);
            Ok(value)
        }
        Err(toml_error) => Err(BadSpec::UnparseableFile {
            path: label.into(),
            json_error: json_error.to_string(),
            toml_error: toml_error.to_string(),
        }),
    }
}

/// Allow a TOML document to use `[[step]]` instead of `[[steps]]`.
fn normalize_toml_step_alias(value: &mut serde_json::Value) {
    if let Some(obj) = value.as_object_mut() {
        if !obj.contains_key("steps") {
            if let Some(step) = obj.remove("step") {
                obj.insert("steps".to_string(), step);
            }
        }
    }
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::from(i),
        toml::Value::Float(f) => serde_json::Value::from(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        toml::Value::Array(a) => serde_json::Value::Array(a.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(t) => serde_json::Value::Object(
            t.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect(),
        ),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
