// SYNOID Tensor Probe - Accelerator Backends
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Build-time and runtime detection for candle's accelerator backends.
// Metal covers Apple GPUs (the MPS path), CUDA covers NVIDIA.

use anyhow::{Context, Result};
use candle_core::{Device, DeviceLocation};
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Accelerator backends known to candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accelerator {
    /// Apple Metal (Metal Performance Shaders)
    Metal,
    /// NVIDIA CUDA
    Cuda,
}

impl std::fmt::Display for Accelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accelerator::Metal => write!(f, "Metal"),
            Accelerator::Cuda => write!(f, "CUDA"),
        }
    }
}

/// Build and runtime status of one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub accelerator: Accelerator,
    pub built: bool,
    pub available: bool,
}

impl Accelerator {
    /// Every backend, in auto-detection priority order
    pub const ALL: [Accelerator; 2] = [Accelerator::Metal, Accelerator::Cuda];

    /// The accelerator a machine of this platform would normally carry
    pub fn native() -> Self {
        if cfg!(target_os = "macos") {
            Accelerator::Metal
        } else {
            Accelerator::Cuda
        }
    }

    /// Whether support for this backend was compiled into candle
    pub fn is_built(self) -> bool {
        match self {
            Accelerator::Metal => candle_core::utils::metal_is_available(),
            Accelerator::Cuda => candle_core::utils::cuda_is_available(),
        }
    }

    /// Whether a device at `ordinal` can be opened right now
    pub fn is_available(self, ordinal: usize) -> bool {
        if !self.is_built() {
            return false;
        }
        match self.device(ordinal) {
            Ok(_) => true,
            Err(e) => {
                debug!("[BACKEND] {} #{} not usable: {:#}", self, ordinal, e);
                false
            }
        }
    }

    /// Open the device at `ordinal`
    pub fn device(self, ordinal: usize) -> Result<Device> {
        let device = match self {
            Accelerator::Metal => Device::new_metal(ordinal),
            Accelerator::Cuda => Device::new_cuda(ordinal),
        };
        device.with_context(|| format!("Failed to open {} device #{}", self, ordinal))
    }

    pub fn status(self, ordinal: usize) -> BackendStatus {
        BackendStatus {
            accelerator: self,
            built: self.is_built(),
            available: self.is_available(ordinal),
        }
    }
}

/// Requested device, before availability is taken into account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceleratorChoice {
    #[default]
    Auto,
    Cpu,
    Only(Accelerator),
}

impl FromStr for AcceleratorChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(AcceleratorChoice::Auto),
            "cpu" => Ok(AcceleratorChoice::Cpu),
            "metal" | "mps" => Ok(AcceleratorChoice::Only(Accelerator::Metal)),
            "cuda" | "gpu" => Ok(AcceleratorChoice::Only(Accelerator::Cuda)),
            other => anyhow::bail!(
                "Unknown accelerator '{}' (expected auto, cpu, metal, mps, cuda or gpu)",
                other
            ),
        }
    }
}

impl std::fmt::Display for AcceleratorChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceleratorChoice::Auto => write!(f, "auto"),
            AcceleratorChoice::Cpu => write!(f, "cpu"),
            AcceleratorChoice::Only(acc) => write!(f, "{}", acc),
        }
    }
}

impl AcceleratorChoice {
    /// The backend whose status gets reported for this choice
    pub fn target(self) -> Option<Accelerator> {
        match self {
            AcceleratorChoice::Auto => Some(Accelerator::native()),
            AcceleratorChoice::Cpu => None,
            AcceleratorChoice::Only(acc) => Some(acc),
        }
    }
}

/// Pick the device to run tensors on.
/// Explicit choice > Metal (macOS) > CUDA > CPU.
pub fn select_device(choice: AcceleratorChoice, ordinal: usize) -> Device {
    match choice {
        AcceleratorChoice::Cpu => {
            info!("[BACKEND] Using CPU device (requested)");
            return Device::Cpu;
        }
        AcceleratorChoice::Only(acc) => {
            if let Some(device) = try_open(acc, ordinal) {
                info!("[BACKEND] Using {} device #{} (requested)", acc, ordinal);
                return device;
            }
            warn!("[BACKEND] {} requested but not available, falling back to CPU", acc);
            return Device::Cpu;
        }
        AcceleratorChoice::Auto => {}
    }

    for acc in Accelerator::ALL {
        if acc == Accelerator::Metal && !cfg!(target_os = "macos") {
            continue;
        }
        if let Some(device) = try_open(acc, ordinal) {
            info!("[BACKEND] ✓ Using {} device #{}", acc, ordinal);
            return device;
        }
    }

    info!("[BACKEND] No accelerator detected. Using CPU ({} threads)", num_cpus::get());
    Device::Cpu
}

fn try_open(acc: Accelerator, ordinal: usize) -> Option<Device> {
    if !acc.is_built() {
        return None;
    }
    acc.device(ordinal).ok()
}

/// Stable text form of where a device lives
pub fn describe_device(device: &Device) -> String {
    describe_location(device.location())
}

pub fn describe_location(location: DeviceLocation) -> String {
    match location {
        DeviceLocation::Cpu => "Cpu".to_string(),
        DeviceLocation::Cuda { gpu_id } => format!("Cuda {{ gpu_id: {} }}", gpu_id),
        // candle stores the Metal registry id here, not the ordinal
        DeviceLocation::Metal { gpu_id } => format!("Metal {{ registry_id: {} }}", gpu_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_aliases() {
        assert_eq!("AUTO".parse::<AcceleratorChoice>().unwrap(), AcceleratorChoice::Auto);
        assert_eq!(" cpu ".parse::<AcceleratorChoice>().unwrap(), AcceleratorChoice::Cpu);
        assert_eq!(
            "mps".parse::<AcceleratorChoice>().unwrap(),
            AcceleratorChoice::Only(Accelerator::Metal)
        );
        assert_eq!(
            "Gpu".parse::<AcceleratorChoice>().unwrap(),
            AcceleratorChoice::Only(Accelerator::Cuda)
        );
        assert!("tpu".parse::<AcceleratorChoice>().is_err());
    }

    #[test]
    fn test_available_implies_built() {
        for acc in Accelerator::ALL {
            let status = acc.status(0);
            println!("{:?}", status);
            assert!(!status.available || status.built);
        }
    }

    #[test]
    fn test_cpu_choice_selects_cpu() {
        let device = select_device(AcceleratorChoice::Cpu, 0);
        assert!(device.is_cpu());
        assert_eq!(describe_device(&device), "Cpu");
    }

    #[test]
    fn test_unavailable_backend_falls_back() {
        for acc in Accelerator::ALL {
            if acc.is_available(0) {
                continue;
            }
            let device = select_device(AcceleratorChoice::Only(acc), 0);
            assert!(device.is_cpu());
        }
    }

    #[test]
    fn test_describe_location() {
        assert_eq!(
            describe_location(DeviceLocation::Metal { gpu_id: 4294968573 }),
            "Metal { registry_id: 4294968573 }"
        );
        assert_eq!(describe_location(DeviceLocation::Cuda { gpu_id: 1 }), "Cuda { gpu_id: 1 }");
    }
}
