// SYNOID Tensor Probe
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod backend;
pub mod config;
pub mod probe;

/// Version of this probe binary
pub fn probe_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
#[path = "../build/lockfile.rs"]
mod lockfile;
