//! Test helpers for the `spl` CLI's behavioral specifications.
//!
//! These tests are black-box: they invoke the `spl` binary and a handful
//! of tiny fixture scripts standing in for the cluster workload manager,
//! then inspect stdout/stderr/exit codes and any files written to disk.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// The scheduler driver binary, built by this workspace.
pub fn spl_schedule() -> Command {
    Command::cargo_bin("spl-schedule").expect("spl-schedule binary should be built by cargo test")
}

/// The fan-out driver binary, built by this workspace.
pub fn spl_fanout() -> Command {
    Command::cargo_bin("spl-fanout").expect("spl-fanout binary should be built by cargo test")
}

/// The status driver binary, built by this workspace.
pub fn spl_status() -> Command {
    Command::cargo_bin("spl-status").expect("spl-status binary should be built by cargo test")
}

/// Write `contents` to `path` and mark it executable.
pub fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(perms.mode() | 0o700);
    fs::set_permissions(path, perms).unwrap();
}

/// A step script that prints one `TASK:` line and exits 0.
pub fn task_script(dir: &Path, name: &str, task_line: &str) -> PathBuf {
    let path = dir.join(format!("{name}.sh"));
    write_executable(&path, &format!("#!/bin/sh\necho '{task_line}'\n"));
    path
}

/// A fake `sbatch` that echoes a fixed job ID in the real submitter's
/// expected response shape (`Submitted batch job <id>`), recording every
/// invocation's stdin to `<bin_dir>/calls/<n>.script` for inspection.
pub fn fake_sbatch(bin_dir: &Path, job_id: u64) -> PathBuf {
    fs::create_dir_all(bin_dir.join("calls")).unwrap();
    let path = bin_dir.join("sbatch");
    write_executable(
        &path,
        &format!(
            "#!/bin/sh\nn=$(ls {calls} | wc -l)\ncat > {calls}/$n.script\necho \"Submitted batch job {job_id}\"\n",
            calls = bin_dir.join("calls").display(),
        ),
    );
    path
}

/// A fake `sbatch` that always exits non-zero, simulating a rejected
/// submission.
pub fn failing_sbatch(bin_dir: &Path) -> PathBuf {
    let path = bin_dir.join("sbatch");
    write_executable(&path, "#!/bin/sh\ncat > /dev/null\necho 'rejected' 1>&2\nexit 17\n");
    path
}

/// A fake `sacct` returning one pipe-delimited table row per `(id, state,
/// elapsed, nodelist)` tuple, matching the accounting command's documented
/// output shape (§4.2): a header line, then one record per job.
pub fn fake_sacct(bin_dir: &Path, rows: &[(u64, &str, &str, &str)]) -> PathBuf {
    let mut body = String::from("#!/bin/sh\ncat <<'EOF'\nJobId|JobName|State|Elapsed|Nodelist\n");
    for (id, state, elapsed, node) in rows {
        body.push_str(&format!("{id}|name-{id}|{state}|{elapsed}|{node}\n"));
    }
    body.push_str("EOF\n");
    let path = bin_dir.join("sacct");
    write_executable(&path, &body);
    path
}

/// Prepend `bin_dir` to `PATH` for a command, so a fixture `sbatch` /
/// `sacct` shadows (or stands in for) the real ones.
pub fn with_fake_path(cmd: &mut Command, bin_dir: &Path) {
    let path = std::env::var_os("PATH").unwrap_or_default();
    let mut new_path = bin_dir.as_os_str().to_owned();
    new_path.push(":");
    new_path.push(path);
    cmd.env("PATH", new_path);
}
