// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Input path expansion.
//!
//! A path may use wildcards in its file name component:
//! - `*` matches any (possibly empty) run of characters
//! - `?` matches exactly one character
//!
//! Directory components are taken literally.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Check whether a path component contains wildcards.
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Wildcard matching over characters, with `*` and `?`.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` seen and the name index it resumed from.
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, n));
            p += 1;
        } else if let Some((star_p, star_n)) = star {
            p = star_p + 1;
            n = star_n + 1;
            star = Some((star_p, star_n + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Expand one input argument into the files it names, sorted by path.
///
/// An argument without wildcards is returned as-is, even if it does not
/// exist; opening it reports the error.
pub fn expand(pattern: &str) -> io::Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let file_pattern = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if has_wildcard(name) => name,
        _ => return Ok(vec![path.to_path_buf()]),
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut matches = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| wildcard_match(file_pattern, n)) {
            matches.push(path.with_file_name(name));
        }
    }
    matches.sort();
    Ok(matches)
}
