use crate::prelude::*;

#[test]
fn dry_run_renders_scripts_to_disk_without_submitting_them() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    // A submitter that would fail the test if it were ever invoked.
    failing_sbatch(&bin);

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();

    let mut cmd = spl_fanout();
    cmd.args(["--dryRun", "--noArray", "--linesPerJob", "1", "--dir"])
        .arg(&out)
        .args(["--", "echo"]);
    with_fake_path(&mut cmd, &bin);
    cmd.write_stdin("a\nb\n");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["initial"], serde_json::json!([]));
    assert_eq!(summary["all"], serde_json::json!([]));

    let rendered: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sbatch"))
        .collect();
    assert_eq!(rendered.len(), 2, "one scalar script per chunk should be rendered to disk");
}
