use crate::prelude::*;
use serde_json::Value;

/// An `error step` is only chained with `afternotok`, the inverse polarity
/// of an ordinary dependency, and joined with `?` instead of `,`.
#[test]
fn chains_an_error_step_with_afternotok_dependencies() {
    let dir = tempfile::tempdir().unwrap();

    let a = task_script(dir.path(), "a", "TASK: t 30");

    let marker = dir.path().join("rescue.called");
    let rescue = dir.path().join("rescue.sh");
    write_executable(
        &rescue,
        &format!(
            "#!/bin/sh\necho \"dep=$SP_DEPENDENCY_ARG\" > {marker}\necho 'TASK: u 31'\n",
            marker = marker.display(),
        ),
    );

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string()},
            {
                "name": "rescue",
                "script": rescue.display().to_string(),
                "dependencies": ["a"],
                "error step": true,
            },
        ]
    });
    let spec_path = dir.path().join("spec.json");
    std::fs::write(&spec_path, serde_json::to_string(&spec).unwrap()).unwrap();

    let status_path = dir.path().join("status.json");
    spl_schedule()
        .args(["--specification"])
        .arg(&spec_path)
        .args(["--output"])
        .arg(&status_path)
        .assert()
        .success();

    let status: Value = serde_json::from_str(&std::fs::read_to_string(&status_path).unwrap()).unwrap();
    assert_eq!(status["steps"][1]["error step"], true);

    let call = std::fs::read_to_string(&marker).unwrap();
    assert!(
        call.contains("dep=--dependency=afternotok:30"),
        "expected an afternotok dependency on the upstream job, got {call:?}"
    );
}
