// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;

fn script_printing(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn parses_a_single_task_line_with_job_ids() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(dir.path(), "a.sh", "echo 'TASK: t 10 11'");
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let outcome = run_step_script("a", &script, &invocation).await.unwrap();
    assert_eq!(outcome.tasks["t"], [10, 11].into_iter().collect());
}

#[tokio::test]
async fn an_empty_job_id_list_records_an_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(dir.path(), "a.sh", "echo 'TASK: t'");
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let outcome = run_step_script("a", &script, &invocation).await.unwrap();
    assert!(outcome.tasks["t"].is_empty());
}

#[tokio::test]
async fn unions_job_ids_across_repeated_task_names() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(
        dir.path(),
        "a.sh",
        "echo 'TASK: t 1 2'\necho 'TASK: t 3'",
    );
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let outcome = run_step_script("a", &script, &invocation).await.unwrap();
    assert_eq!(outcome.tasks["t"], [1, 2, 3].into_iter().collect());
}

#[tokio::test]
async fn ignores_output_lines_that_do_not_match_task_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(
        dir.path(),
        "a.sh",
        "echo 'starting up'\necho 'TASK: t 7'\necho 'done'",
    );
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let outcome = run_step_script("a", &script, &invocation).await.unwrap();
    assert_eq!(outcome.tasks.len(), 1);
    assert!(outcome.stdout.contains("starting up"));
}

#[tokio::test]
async fn rejects_a_non_integer_trailing_token() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(dir.path(), "a.sh", "echo 'TASK: t soon'");
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let err = run_step_script("a", &script, &invocation).await.unwrap_err();
    assert!(matches!(err, ScheduleError::MalformedTaskLine { .. }));
}

#[tokio::test]
async fn rejects_a_duplicate_job_id_on_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(dir.path(), "a.sh", "echo 'TASK: t 5 5'");
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let err = run_step_script("a", &script, &invocation).await.unwrap_err();
    assert!(matches!(err, ScheduleError::DuplicateJobIdOnLine { .. }));
}

#[tokio::test]
async fn a_non_zero_exit_is_reported_with_captured_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(dir.path(), "a.sh", "echo 'oops' >&2\nexit 3");
    let env = BTreeMap::new();
    let invocation = Invocation {
        argv: &[],
        env: &env,
        cwd: None,
    };
    let err = run_step_script("a", &script, &invocation).await.unwrap_err();
    match err {
        ScheduleError::ScriptFailed { status, stderr, .. } => {
            assert_eq!(status, Some(3));
            assert!(stderr.contains("oops"));
        }
        other => panic!("expected ScriptFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn passes_argv_and_environment_through_to_the_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = script_printing(
        dir.path(),
        "a.sh",
        "echo \"TASK: $1 1\"\necho \"force=$SP_FORCE\"",
    );
    let mut env = BTreeMap::new();
    env.insert("SP_FORCE".to_string(), "1".to_string());
    let argv = vec!["sample-1".to_string()];
    let invocation = Invocation {
        argv: &argv,
        env: &env,
        cwd: None,
    };
    let outcome = run_step_script("a", &script, &invocation).await.unwrap();
    assert!(outcome.tasks.contains_key("sample-1"));
    assert!(outcome.stdout.contains("force=1"));
}

#[test]
fn resolved_script_joins_a_relative_script_with_cwd() {
    let cwd = std::path::Path::new("/work/pipeline");
    let script = std::path::Path::new("align.sh");
    assert_eq!(
        resolved_script(script, Some(cwd)),
        std::path::PathBuf::from("/work/pipeline/align.sh")
    );
}
