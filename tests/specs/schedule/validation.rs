use crate::prelude::*;

#[test]
fn rejects_a_dependency_on_a_step_that_does_not_exist() {
    let dir = tempfile::tempdir().unwrap();
    let a = task_script(dir.path(), "a", "TASK: t 1");

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string(), "dependencies": ["nope"]},
        ]
    });
    let spec_path = dir.path().join("spec.json");
    std::fs::write(&spec_path, serde_json::to_string(&spec).unwrap()).unwrap();

    let assert = spl_schedule()
        .args(["--specification"])
        .arg(&spec_path)
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("nope"), "expected the unknown dependency's name in the error, got {stderr:?}");
}

#[test]
fn rejects_a_step_whose_script_does_not_exist_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": dir.path().join("missing.sh").display().to_string()},
        ]
    });
    let spec_path = dir.path().join("spec.json");
    std::fs::write(&spec_path, serde_json::to_string(&spec).unwrap()).unwrap();

    spl_schedule()
        .args(["--specification"])
        .arg(&spec_path)
        .assert()
        .failure();
}

#[test]
fn rejects_a_document_that_has_already_been_scheduled() {
    let dir = tempfile::tempdir().unwrap();
    let a = task_script(dir.path(), "a", "TASK: t 1");

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string()},
        ],
        "scheduledAt": 1_700_000_000.0,
    });
    let spec_path = dir.path().join("spec.json");
    std::fs::write(&spec_path, serde_json::to_string(&spec).unwrap()).unwrap();

    spl_schedule()
        .args(["--specification"])
        .arg(&spec_path)
        .assert()
        .failure();
}

#[test]
fn rejects_a_step_with_two_steps_sharing_one_name() {
    let dir = tempfile::tempdir().unwrap();
    let a = task_script(dir.path(), "a", "TASK: t 1");

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string()},
            {"name": "a", "script": a.display().to_string()},
        ]
    });
    let spec_path = dir.path().join("spec.json");
    std::fs::write(&spec_path, serde_json::to_string(&spec).unwrap()).unwrap();

    spl_schedule()
        .args(["--specification"])
        .arg(&spec_path)
        .assert()
        .failure();
}
