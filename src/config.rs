// SYNOID Tensor Probe - Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::backend::AcceleratorChoice;
use tracing::warn;

pub const ACCELERATOR_VAR: &str = "TENSOR_PROBE_ACCELERATOR";
pub const ORDINAL_VAR: &str = "TENSOR_PROBE_ORDINAL";

/// How the report is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeConfig {
    pub choice: AcceleratorChoice,
    /// GPU index to open
    pub ordinal: usize,
    pub output: OutputFormat,
}

impl ProbeConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup. Bad values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ACCELERATOR_VAR) {
            match raw.parse::<AcceleratorChoice>() {
                Ok(choice) => config.choice = choice,
                Err(e) => warn!("[CONFIG] {} in {}, using auto-detection", e, ACCELERATOR_VAR),
            }
        }

        if let Some(raw) = lookup(ORDINAL_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(ordinal) => config.ordinal = ordinal,
                Err(_) => warn!("[CONFIG] Invalid {}='{}', using device #0", ORDINAL_VAR, raw),
            }
        }

        config
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        choice: Option<AcceleratorChoice>,
        ordinal: Option<usize>,
        json: bool,
    ) -> Self {
        if let Some(choice) = choice {
            self.choice = choice;
        }
        if let Some(ordinal) = ordinal {
            self.ordinal = ordinal;
        }
        if json {
            self.output = OutputFormat::Json;
        }
        self
    }
}
