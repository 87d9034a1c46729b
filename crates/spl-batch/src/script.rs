// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of `#SBATCH` script text for both array and scalar mode.
//!
//! Every function here is a pure string builder: deciding what to write to
//! disk, and actually writing it, is the caller's job (see `io`).

use crate::naming::{file_prefix, Stage};
use crate::options::BatchOptions;
use spl_core::job::JobId;
use std::fmt::Write as _;
use std::path::Path;

/// How a chunk's input reaches the command's stdin.
pub enum InputClause<'a> {
    /// No input at all (a `--then`/`--else`/`--finally` follow-on command).
    None,
    /// A shell here-document embedding `stdin` verbatim (scalar mode only).
    Inline(&'a str),
    /// Redirection from a file already written to disk, optionally piped
    /// through `zstd -dc`.
    File { path: &'a Path, compressed: bool },
}

impl InputClause<'_> {
    fn render(&self) -> String {
        match self {
            InputClause::None => String::new(),
            InputClause::Inline(stdin) => {
                let delim = "EOT-".repeat(10);
                debug_assert!(!stdin.contains(&delim));
                let trailing_newline = if stdin.ends_with('\n') { "" } else { "\n" };
                format!("<<'{delim}'\n{stdin}{trailing_newline}{delim}")
            }
            InputClause::File { path, compressed } => {
                let path = path.display();
                if *compressed {
                    format!("< <(zstd -dc \"{path}\")")
                } else {
                    format!("< \"{path}\"")
                }
            }
        }
    }
}

fn creation_info() -> String {
    format!(
        "Generated {} by {}.",
        chrono::Local::now().to_rfc2822(),
        std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
    )
}

fn dependency_comment(after: &[JobId], stage: Stage) -> String {
    if after.is_empty() {
        String::new()
    } else {
        let ids: Vec<String> = after.iter().map(JobId::to_string).collect();
        format!(
            "# Would be run with sbatch --dependency {}:{}",
            stage.condition(),
            ids.join(":")
        )
    }
}

fn sleep_clause(random_sleep: Option<u32>) -> String {
    match random_sleep {
        Some(n) => format!("sleep $(( 1 + RANDOM % {n} ))"),
        None => String::new(),
    }
}

/// Render the single shared script for array-mode submission. `n_jobs`
/// array elements each select their own input file at runtime by zero-
/// padding `${SLURM_ARRAY_TASK_ID}` to `options.digits`.
pub fn array_script(
    n_jobs: usize,
    command: &str,
    options: &BatchOptions,
    stage: Stage,
    after: &[JobId],
    compressed: bool,
) -> String {
    let prefix = file_prefix(options, stage, None, true, false, 0);
    let prefix_no_zeroes = file_prefix(options, stage, None, true, false, 0);
    let header_prefix = file_prefix(options, stage, None, true, true, 0);

    let input_file = if compressed {
        format!("{}.in.zst", prefix_no_zeroes.display())
    } else {
        format!("{}.in", prefix_no_zeroes.display())
    };
    let input_clause = InputClause::File {
        path: Path::new(&input_file),
        compressed,
    }
    .render();

    let out = format!("{}.out", prefix.display());
    let err = format!("{}.err", prefix.display());
    let slurm_out_header = format!("{}.slurm", header_prefix.display());
    let slurm_out = format!("{}.slurm", prefix.display());
    let job_name = format!("{}{}", options.job_name_prefix, stage.label());

    let array_max = match options.array_max {
        Some(n) => format!("%{n}"),
        None => String::new(),
    };

    let mut script = String::new();
    let _ = writeln!(script, "#!/bin/bash");
    let _ = writeln!(script);
    let _ = writeln!(script, "#SBATCH -J {job_name}");
    let _ = writeln!(script, "#SBATCH -o {slurm_out_header}");
    let _ = writeln!(script, "#SBATCH -p {}", options.partition);
    let _ = writeln!(script, "#SBATCH --array=1-{n_jobs}{array_max}");
    let _ = writeln!(script, "#SBATCH --nodes=1");
    let _ = writeln!(script, "#SBATCH --cpus-per-task={}", options.cpus);
    let _ = writeln!(script, "#SBATCH --mem={}", options.mem);
    let _ = writeln!(script, "#SBATCH --time={}", options.time_per_job);
    let _ = writeln!(script);
    let _ = writeln!(script, "set -Eeuo pipefail");
    let _ = writeln!(script);
    let _ = writeln!(script, "# {}", creation_info());
    let _ = writeln!(script, "{}", dependency_comment(after, stage));
    let _ = writeln!(script);
    let _ = writeln!(script, "{}", sleep_clause(options.random_sleep));
    let _ = writeln!(script);
    let _ = writeln!(
        script,
        "count_=$(printf '%*d' {} $SLURM_ARRAY_TASK_ID | tr ' ' 0)",
        options.digits
    );
    let _ = writeln!(
        script,
        "out_=$(echo \"{out}\" | sed -e \"s/-$SLURM_ARRAY_TASK_ID\\.out\\$/-$count_.out/\")"
    );
    let _ = writeln!(
        script,
        "err_=$(echo \"{err}\" | sed -e \"s/-$SLURM_ARRAY_TASK_ID\\.err\\$/-$count_.err/\")"
    );
    let _ = writeln!(script);

    if options.make_done_files {
        let done = format!("{}.done", prefix.display());
        let _ = writeln!(script, "rm -f \"{done}\"");
    }
    let _ = writeln!(script);

    let _ = writeln!(script, "exec > \"$out_\" 2> \"$err_\"");
    let _ = writeln!(script);
    let _ = writeln!(script, "{command} {input_clause}");
    let _ = writeln!(script);

    if options.make_done_files {
        let done = format!("{}.done", prefix.display());
        let _ = writeln!(script, "touch \"{done}\"");
    }
    if options.remove_inputs {
        let _ = writeln!(script, "rm \"{input_file}\"");
    }
    if !options.keep_error_files {
        let _ = writeln!(script, "test -s \"$err_\" || rm \"$err_\"");
    }
    if !options.keep_slurm_files {
        let _ = writeln!(
            script,
            "test -e \"{slurm_out}\" && ( test -s \"{slurm_out}\" || rm \"{slurm_out}\" )"
        );
    }

    script
}

/// Render a scalar-mode script for one chunk. The caller has already
/// decided `input_clause` (a heredoc, a file redirection, or nothing) and
/// written any input file it references.
pub fn scalar_script(
    command: &str,
    count: usize,
    options: &BatchOptions,
    stage: Stage,
    after: &[JobId],
    input_clause: &InputClause<'_>,
) -> String {
    let prefix = file_prefix(options, stage, Some(count), false, false, options.digits);
    let out = format!("{}.out", prefix.display());
    let err = format!("{}.err", prefix.display());
    let slurm_out = format!("{}.slurm", prefix.display());
    let job_name = format!(
        "{}{}-{:0width$}",
        options.job_name_prefix,
        stage.label(),
        count,
        width = options.digits
    );

    let mut script = String::new();
    let _ = writeln!(script, "#!/bin/bash");
    let _ = writeln!(script);
    let _ = writeln!(script, "#SBATCH -J {job_name}");
    let _ = writeln!(script, "#SBATCH -o {slurm_out}");
    let _ = writeln!(script, "#SBATCH -p {}", options.partition);
    let _ = writeln!(script, "#SBATCH --nodes=1");
    let _ = writeln!(script, "#SBATCH --cpus-per-task={}", options.cpus);
    let _ = writeln!(script, "#SBATCH --mem={}", options.mem);
    let _ = writeln!(script, "#SBATCH --time={}", options.time_per_job);
    let _ = writeln!(script);
    let _ = writeln!(script, "set -Eeuo pipefail");
    let _ = writeln!(script);
    let _ = writeln!(script, "# {}", creation_info());
    let _ = writeln!(script, "{}", dependency_comment(after, stage));
    let _ = writeln!(script);
    let _ = writeln!(script, "{}", sleep_clause(options.random_sleep));
    let _ = writeln!(script);

    if options.make_done_files {
        let done = format!("{}.done", prefix.display());
        let _ = writeln!(script, "rm -f \"{done}\"");
    }
    let _ = writeln!(script);

    let _ = writeln!(script, "exec > \"{out}\" 2> \"{err}\"");
    let _ = writeln!(script);
    let _ = writeln!(script, "{command} {}", input_clause.render());
    let _ = writeln!(script);

    if options.make_done_files {
        let done = format!("{}.done", prefix.display());
        let _ = writeln!(script, "touch \"{done}\"");
    }
    let _ = writeln!(script);

    if let InputClause::File { path, .. } = input_clause {
        if options.remove_inputs {
            let _ = writeln!(script, "rm \"{}\"", path.display());
        }
    }
    if !options.keep_error_files {
        let _ = writeln!(script, "test -s \"{err}\" || rm \"{err}\"");
    }
    if !options.keep_slurm_files {
        let _ = writeln!(
            script,
            "test -e \"{slurm_out}\" && ( test -s \"{slurm_out}\" || rm \"{slurm_out}\" )"
        );
    }

    script
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
