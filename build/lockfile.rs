// SYNOID Tensor Probe - Dependency Version Lookup
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Shared by build.rs and the unit tests.

use std::fs;
use std::path::{Path, PathBuf};

pub const CRATE_NAME: &str = "candle-core";

/// Exact version from the nearest lockfile, or the manifest requirement labelled as such.
pub fn resolve_version(manifest_dir: &Path) -> Option<(String, Option<PathBuf>)> {
    if let Some((lock_path, version)) = find_locked_version(manifest_dir) {
        return Some((version, Some(lock_path)));
    }
    let manifest = fs::read_to_string(manifest_dir.join("Cargo.toml")).ok()?;
    let requirement = required_version(&manifest)?;
    Some((format!("{} (requirement)", requirement), None))
}

/// Walks from `start` up to the filesystem root looking for a lockfile that pins candle-core.
pub fn find_locked_version(start: &Path) -> Option<(PathBuf, String)> {
    start.ancestors().find_map(|dir| {
        let lock_path = dir.join("Cargo.lock");
        let lock = fs::read_to_string(&lock_path).ok()?;
        locked_version(&lock).map(|v| (lock_path, v))
    })
}

/// Finds `version = "..."` in the `[[package]]` entry named candle-core.
pub fn locked_version(lock: &str) -> Option<String> {
    let name_line = format!("name = \"{}\"", CRATE_NAME);
    let mut lines = lock.lines();
    while let Some(line) = lines.next() {
        if line.trim() != name_line {
            continue;
        }
        for next in lines.by_ref() {
            let next = next.trim();
            if next.is_empty() || next.starts_with("[[") {
                break;
            }
            if let Some(v) = next.strip_prefix("version = ") {
                return Some(v.trim_matches('"').to_string());
            }
        }
    }
    None
}

/// Reads the requirement from `candle-core = "..."` or `candle-core = { version = "..." }`.
pub fn required_version(manifest: &str) -> Option<String> {
    let line = manifest.lines().map(str::trim).find(|l| {
        l.strip_prefix(CRATE_NAME)
            .map_or(false, |rest| rest.trim_start().starts_with('='))
    })?;
    let rhs = line.split_once('=')?.1.trim();
    let quoted = match rhs.find("version") {
        Some(idx) => rhs[idx..].split_once('=')?.1.trim(),
        None => rhs,
    };
    let v = quoted.trim_start_matches('"').split('"').next()?.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}
