use crate::prelude::*;

#[test]
fn reports_progress_against_a_scheduled_status_document() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    fake_sacct(&bin, &[(10, "COMPLETED", "00:01:00", "node01"), (11, "RUNNING", "00:00:30", "node02")]);

    let a = task_script(dir.path(), "a", "TASK: t1 10");
    let b = task_script(dir.path(), "b", "TASK: t2 11");

    let spec = serde_json::json!({
        "steps": [
            {"name": "a", "script": a.display().to_string()},
            {"name": "b", "script": b.display().to_string()},
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

    let mut cmd = spl_status();
    cmd.args(["--specification"]).arg(&status_path).args(["--printFinished"]);
    with_fake_path(&mut cmd, &bin);
    let assert = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout.trim(), "10");

    let mut cmd = spl_status();
    cmd.args(["--specification"]).arg(&status_path).args(["--printUnfinished"]);
    with_fake_path(&mut cmd, &bin);
    let assert = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout.trim(), "11");

    let mut cmd = spl_status();
    cmd.args(["--specification"]).arg(&status_path);
    with_fake_path(&mut cmd, &bin);
    let assert = cmd.assert().success();
    let report = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(report.contains("Steps summary:"));
    assert!(report.contains("Step 1: a"));
    assert!(report.contains("Step 2: b"));
}

#[test]
fn report_shows_first_step_and_force_the_way_the_spec_scenario_expects() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    fake_sacct(&bin, &[(10, "COMPLETED", "00:01:00", "node01"), (11, "COMPLETED", "00:00:30", "node02")]);

    let first = task_script(dir.path(), "first", "TASK: t1 10");
    let second = task_script(dir.path(), "second", "TASK: t2 11");

    let spec = serde_json::json!({
        "steps": [
            {"name": "first", "script": first.display().to_string()},
            {"name": "second", "script": second.display().to_string()},
        ]
    });
    let spec_path = dir.path().join("spec.json");
    std::fs::write(&spec_path, serde_json::to_string(&spec).unwrap()).unwrap();

    let status_path = dir.path().join("status.json");
    let mut cmd = spl_schedule();
    cmd.args(["--specification"])
        .arg(&spec_path)
        .args(["--force"])
        .args(["--firstStep", "second"])
        .args(["--output"])
        .arg(&status_path);
    with_fake_path(&mut cmd, &bin);
    cmd.assert().success();

    let mut cmd = spl_status();
    cmd.args(["--specification"]).arg(&status_path);
    with_fake_path(&mut cmd, &bin);
    let assert = cmd.assert().success();
    let report = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(report.contains("First step: second"));
    assert!(report.contains("Force: True"));
    assert!(report.contains("1 (100.00%) finished") || report.contains("(100.00%) finished"));
}
