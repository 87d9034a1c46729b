use crate::prelude::*;
use serde_json::Value;

#[test]
fn runs_a_success_chained_pair_of_steps_with_the_upstream_job_ids() {
    let dir = tempfile::tempdir().unwrap();

    let a = dir.path().join("a.sh");
    write_executable(&a, "#!/bin/sh\necho 'TASK: t 10'\n");

    let marker = dir.path().join("b.called");
    let b = dir.path().join("b.sh");
    write_executable(
        &b,
        &format!(
            "#!/bin/sh\necho \"argv=$@ dep=$SP_DEPENDENCY_ARG\" > {marker}\necho 'TASK: u 20'\n",
            marker = marker.display(),
        ),
    );

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string()},
            {"name": "b", "script": b.display().to_string(), "dependencies": ["a"]},
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
    assert_eq!(status["steps"][0]["name"], "a");
    assert_eq!(status["steps"][0]["tasks"]["t"], serde_json::json!([10]));
    assert_eq!(status["steps"][1]["taskDependencies"]["t"], serde_json::json!([10]));

    let b_call = std::fs::read_to_string(&marker).unwrap();
    assert!(b_call.contains("argv=t "), "expected argv to be the single task name, got {b_call:?}");
    assert!(
        b_call.contains("dep=--dependency=afterok:10"),
        "expected SP_DEPENDENCY_ARG to chain on job 10, got {b_call:?}"
    );
}
