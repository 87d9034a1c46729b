// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural validation of an untyped specification document.
//!
//! This mirrors a pipeline scheduler's own two-stage check: shape first
//! (every step has a name, a script, dependencies that resolve, no
//! duplicate names), then the filesystem (does the script referenced by
//! each step actually exist and is it executable). Doing this against the
//! raw [`serde_json::Value`] rather than the deserialized
//! [`spl_core::Step`] lets error messages cite the one-based step count the
//! same way a human reading the specification file would.

use spl_core::error::BadSpec;
use std::collections::HashSet;
use std::path::Path;

/// Check that `value` is a well-formed pipeline specification.
///
/// Does not touch the filesystem; see [`check_scripts_exist`] for the
/// second pass that does.
pub fn check_specification(value: &serde_json::Value) -> Result<(), BadSpec> {
    let root = value.as_object().ok_or(BadSpec::NotAnObject)?;

    if root.contains_key("scheduledAt") {
        return Err(BadSpec::AlreadyScheduled);
    }

    let steps = root.get("steps").ok_or(BadSpec::MissingSteps)?;
    let steps = steps.as_array().ok_or(BadSpec::StepsNotAList)?;

    let mut step_names: HashSet<String> = HashSet::new();

    for (index, step) in steps.iter().enumerate() {
        let step = step.as_object().ok_or(BadSpec::StepNotAnObject { index })?;

        let name = step.get("name").ok_or(BadSpec::StepMissingName { index })?;
        let name = name
            .as_str()
            .ok_or(BadSpec::StepNameNotAString { index })?
            .to_string();

        if !step.contains_key("script") {
            return Err(BadSpec::StepMissingScript { index, name });
        }
        if !step["script"].is_string() {
            return Err(BadSpec::StepScriptNotAString { index, name });
        }

        if step_names.contains(&name) {
            return Err(BadSpec::DuplicateStepName { index, name });
        }

        let has_dependencies = step
            .get("dependencies")
            .map(|d| d.as_array().is_some_and(|a| !a.is_empty()))
            .unwrap_or(false);
        if step.contains_key("collect") && !has_dependencies {
            return Err(BadSpec::CollectWithoutDependencies { index, name });
        }

        step_names.insert(name.clone());

        if let Some(dependencies) = step.get("dependencies") {
            let dependencies = dependencies
                .as_array()
                .ok_or_else(|| BadSpec::DependenciesNotAList {
                    index,
                    name: name.clone(),
                })?;

            for dependency in dependencies {
                let dependency = dependency.as_str().unwrap_or_default();
                if dependency == name {
                    return Err(BadSpec::SelfDependency { index, name });
                }
                if !step_names.contains(dependency) {
                    return Err(BadSpec::UnknownDependency {
                        index,
                        name,
                        dependency: dependency.to_string(),
                    });
                }
            }
        }
    }

    if let Some(skip) = root.get("skip") {
        let skip = skip.as_array().ok_or(BadSpec::SkipNotAList)?;
        for name in skip {
            let name = name.as_str().unwrap_or_default();
            if !step_names.contains(name) {
                return Err(BadSpec::UnknownSkipStep(name.to_string()));
            }
        }
    }

    Ok(())
}

/// Check that every step's script exists on disk and is executable, and
/// that every step's working directory (if any) exists.
///
/// Run only after [`check_specification`] has confirmed the document is
/// well-formed enough to address steps positionally.
#[allow(clippy::expect_used)]
pub fn check_scripts_exist(value: &serde_json::Value) -> Result<(), BadSpec> {
    let steps = value["steps"].as_array().expect("shape already checked");

    for (index, step) in steps.iter().enumerate() {
        let script = step["script"].as_str().expect("shape already checked");

        let resolved = match step.get("cwd").and_then(|c| c.as_str()) {
            Some(cwd) => {
                if !Path::new(cwd).is_dir() {
                    return Err(BadSpec::CwdMissing {
                        index,
                        cwd: cwd.to_string(),
                    });
                }
                if Path::new(script).is_absolute() {
                    script.to_string()
                } else {
                    Path::new(cwd).join(script).display().to_string()
                }
            }
            None => script.to_string(),
        };

        if !Path::new(&resolved).exists() {
            return Err(BadSpec::ScriptMissing {
                index,
                script: script.to_string(),
            });
        }

        if !is_executable(Path::new(&resolved)) {
            return Err(BadSpec::ScriptNotExecutable {
                index,
                script: script.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
