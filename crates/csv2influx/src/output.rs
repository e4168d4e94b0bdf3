// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Where converted Line Protocol text is written.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Extension appended to input file names in directory mode.
pub const OUTPUT_EXTENSION: &str = "out";

/// Output destination for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Lines are not written to disk.
    #[default]
    Discard,
    /// All inputs are appended to a single file.
    File(PathBuf),
    /// One `<input file name>.out` file per input inside this directory.
    Directory(PathBuf),
}

impl OutputTarget {
    /// Interpret an `--output-path` value.
    ///
    /// A value ending with the path separator names a directory, anything
    /// else names a file.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("") => OutputTarget::Discard,
            Some(path) if path.ends_with(MAIN_SEPARATOR) || path.ends_with('/') => {
                OutputTarget::Directory(PathBuf::from(path))
            }
            Some(path) => OutputTarget::File(PathBuf::from(path)),
        }
    }

    /// Destination file for a given input, if any.
    pub fn path_for(&self, input: &Path) -> Option<PathBuf> {
        match self {
            OutputTarget::Discard => None,
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Directory(dir) => {
                let mut name = input
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_else(|| "stdin".into());
                name.push(".");
                name.push(OUTPUT_EXTENSION);
                Some(dir.join(name))
            }
        }
    }

    /// Append `payload` to the destination for `input`.
    ///
    /// Returns the file written, or `None` when output is discarded.
    pub fn write(&self, input: &Path, payload: &str) -> io::Result<Option<PathBuf>> {
        let Some(path) = self.path_for(input) else {
            return Ok(None);
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(payload.as_bytes())?;
        file.flush()?;
        Ok(Some(path))
    }
}
