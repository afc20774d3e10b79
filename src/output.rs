// harborctl - CLI for the Harbor container registry API
// Copyright (C) 2026 harborctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Destination policy for rendered output: stdout, file (with overwrite
//! guard), both, or a pager. The formatter itself never performs I/O; this
//! module is the single place where bytes leave the process.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::{env, fs};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Write output to this file instead of stdout.
    pub file: Option<PathBuf>,
    /// Refuse to overwrite an existing output file.
    pub no_overwrite: bool,
    /// Print to stdout in addition to the output file.
    pub with_stdout: bool,
    /// Pipe stdout output through a pager.
    pub pager: bool,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("file {path} exists and --no-overwrite is set")]
    Exists { path: PathBuf },
    #[error("writing output to {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

/// Write rendered output to the configured destination.
///
/// The overwrite guard is checked before any bytes are written, so a refused
/// write never leaves a partial file behind. Stdout writes are assumed to
/// succeed.
pub fn write_output(text: &str, opts: &OutputOptions) -> Result<(), OutputError> {
    let mut payload = text.to_string();
    if !payload.ends_with('\n') {
        payload.push('\n');
    }

    if let Some(path) = &opts.file {
        if opts.no_overwrite && path.exists() {
            return Err(OutputError::Exists { path: path.clone() });
        }
        fs::write(path, &payload).map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;
        info!("output written to {}", path.display());
    }

    if opts.file.is_none() || opts.with_stdout {
        if opts.pager {
            page(&payload);
        } else {
            print!("{payload}");
        }
    }

    Ok(())
}

/// Pipe text through `$PAGER` (default `less`), falling back to plain stdout
/// if the pager cannot be spawned.
fn page(text: &str) {
    let pager = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let spawned = Command::new(&pager)
        .stdin(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            child.wait()
        });
    if let Err(e) = spawned {
        debug!("pager {pager} unavailable ({e}), printing to stdout");
        print!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_file_with_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let opts = OutputOptions {
            file: Some(path.clone()),
            ..Default::default()
        };
        write_output("{\"ok\":true}", &opts).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"ok\":true}\n");
    }

    #[test]
    fn overwrite_guard_fails_before_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "original").unwrap();

        let opts = OutputOptions {
            file: Some(path.clone()),
            no_overwrite: true,
            ..Default::default()
        };
        let err = write_output("replacement", &opts).unwrap_err();
        assert!(matches!(err, OutputError::Exists { .. }));
        assert!(err.to_string().contains("no-overwrite"));
        // The original file is untouched.
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn overwrite_allowed_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "original").unwrap();

        let opts = OutputOptions {
            file: Some(path.clone()),
            ..Default::default()
        };
        write_output("replacement", &opts).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "replacement\n");
    }
}
