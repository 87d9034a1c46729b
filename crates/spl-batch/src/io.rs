// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system side effects: chunk input files, rendered `.sbatch` scripts,
//! and the error sidecar written on a rejected submission.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Create `dir` if it does not already exist. Mirrors the original's
/// `exist_ok=False` semantics: an existing directory is left untouched
/// rather than treated as an error.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Write `stdin` to `path_no_ext` plus `.in` (or `.in.zst` when
/// `uncompressed` is `false`), returning the path actually written.
pub fn write_chunk_file(
    path_no_ext: &Path,
    stdin: &str,
    uncompressed: bool,
    compress_level: i32,
) -> io::Result<PathBuf> {
    if uncompressed {
        let path = path_with_suffix(path_no_ext, ".in");
        fs::write(&path, stdin)?;
        Ok(path)
    } else {
        let path = path_with_suffix(path_no_ext, ".in.zst");
        let file = fs::File::create(&path)?;
        let mut encoder = zstd::Encoder::new(file, compress_level)?;
        io::Write::write_all(&mut encoder, stdin.as_bytes())?;
        encoder.finish()?;
        Ok(path)
    }
}

fn path_with_suffix(path_no_ext: &Path, suffix: &str) -> PathBuf {
    let mut s = path_no_ext.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Write every chunk's input file for array-mode submission, returning the
/// number of files written.
pub fn write_input_files<'a>(
    chunks: impl IntoIterator<Item = &'a [String]>,
    path_prefix: impl Fn(usize) -> PathBuf,
    header: Option<&str>,
    uncompressed: bool,
    compress_level: i32,
) -> io::Result<usize> {
    let mut count = 0;
    for (index, lines) in chunks.into_iter().enumerate() {
        count = index + 1;
        let stdin = format!("{}{}", header.unwrap_or(""), lines.concat());
        write_chunk_file(&path_prefix(count), &stdin, uncompressed, compress_level)?;
    }
    Ok(count)
}

/// Write a rendered `.sbatch` script to disk and grant execute permission
/// to every principal that already had read permission.
pub fn write_sbatch_file(text: &str, path: &Path) -> io::Result<()> {
    fs::write(path, format!("{text}\n"))?;
    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    perms.set_mode(mode | ((mode & 0o444) >> 2));
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Persist the rejected script text alongside the `.sbatch-error` sidecar
/// the operator will need to resubmit or inspect.
pub fn write_sbatch_error(text: &str, path: &Path) -> io::Result<()> {
    fs::write(path, format!("{text}\n"))
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
