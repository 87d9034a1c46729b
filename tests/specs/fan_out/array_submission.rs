use crate::prelude::*;

#[test]
fn submits_a_job_array_with_one_file_per_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    fake_sbatch(&bin, 555);

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();

    let mut cmd = spl_fanout();
    cmd.args(["--linesPerJob", "1", "--dir"])
        .arg(&out)
        .args(["--", "echo"]);
    with_fake_path(&mut cmd, &bin);
    cmd.write_stdin("one\ntwo\nthree\n");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["initial"], serde_json::json!([555]));
    assert_eq!(summary["all"], serde_json::json!([555]));

    let calls_dir = bin.join("calls");
    let n_calls = std::fs::read_dir(&calls_dir).unwrap().count();
    assert_eq!(n_calls, 1, "a job array is a single submission regardless of chunk count");

    let rendered = std::fs::read_to_string(calls_dir.join("0.script")).unwrap();
    assert!(rendered.contains("#SBATCH --array=1-3"), "expected a 3-element array script, got {rendered:?}");
}
