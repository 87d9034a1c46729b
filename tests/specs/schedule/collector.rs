use crate::prelude::*;
use serde_json::Value;

/// A collector step runs once, with all of its upstream steps' tasks folded
/// into a single dependency set, rather than once per upstream task.
#[test]
fn runs_a_collector_step_once_with_every_upstream_task_folded_together() {
    let dir = tempfile::tempdir().unwrap();

    let a = task_script(dir.path(), "a", "TASK: t1 11");
    let b = task_script(dir.path(), "b", "TASK: t2 12");

    let marker = dir.path().join("c.calls");
    let c = dir.path().join("c.sh");
    write_executable(
        &c,
        &format!(
            "#!/bin/sh\necho \"call dep=$SP_DEPENDENCY_ARG\" >> {marker}\necho 'TASK: t3 13'\n",
            marker = marker.display(),
        ),
    );

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string()},
            {"name": "b", "script": b.display().to_string()},
            {
                "name": "c",
                "script": c.display().to_string(),
                "dependencies": ["a", "b"],
                "collect": true,
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
    assert_eq!(status["steps"][2]["name"], "c");
    assert_eq!(
        status["steps"][2]["taskDependencies"]["t1"],
        serde_json::json!([11]),
    );
    assert_eq!(
        status["steps"][2]["taskDependencies"]["t2"],
        serde_json::json!([12]),
    );

    let calls = std::fs::read_to_string(&marker).unwrap();
    assert_eq!(calls.lines().count(), 1, "collector step must run exactly once, got {calls:?}");
    assert!(
        calls.contains("dep=--dependency=afterok:11,afterok:12"),
        "collector dependency must chain on both upstream jobs in ascending order, got {calls:?}"
    );
}
