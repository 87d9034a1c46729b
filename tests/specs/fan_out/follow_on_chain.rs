use crate::prelude::*;

#[test]
fn chains_then_else_and_finally_off_the_initial_wave() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    fake_sbatch(&bin, 700);

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();

    let mut cmd = spl_fanout();
    cmd.args(["--linesPerJob", "0", "--dir"])
        .arg(&out)
        .args(["--then", "cleanup", "--else", "rescue", "--finally", "notify", "--", "echo"]);
    with_fake_path(&mut cmd, &bin);
    cmd.write_stdin("one line\n");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();

    // The fake sbatch always hands out job 700, regardless of stage: which
    // branch the cluster actually takes at runtime is outside this
    // process's control, so every declared stage submits unconditionally,
    // distinguished only by the polarity of its `--dependency` condition.
    assert_eq!(summary["initial"], serde_json::json!([700]));
    assert_eq!(summary["then"], serde_json::json!([700]));
    assert_eq!(summary["else"], serde_json::json!([700]));
    assert_eq!(summary["finally"], serde_json::json!([700]));

    let calls_dir = bin.join("calls");
    let n_calls = std::fs::read_dir(&calls_dir).unwrap().count();
    assert_eq!(n_calls, 4, "initial, then, else, and finally each submit exactly once");

    let then_script = std::fs::read_to_string(calls_dir.join("1.script")).unwrap();
    assert!(
        then_script.contains("--dependency afterok:700"),
        "then must depend on the initial job with afterok, got {then_script:?}"
    );

    let else_script = std::fs::read_to_string(calls_dir.join("2.script")).unwrap();
    assert!(
        else_script.contains("--dependency afternotok:700"),
        "else must depend on the then job with afternotok, got {else_script:?}"
    );

    let finally_script = std::fs::read_to_string(calls_dir.join("3.script")).unwrap();
    assert!(
        finally_script.contains("--dependency after:700"),
        "finally must depend on the union of then and else jobs with after, got {finally_script:?}"
    );
}
