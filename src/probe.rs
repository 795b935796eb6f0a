// SYNOID Tensor Probe - Smoke Test Runner
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Queries the tensor library, allocates a random 3x3 tensor and
// moves it onto the accelerator when one is usable.

use crate::backend::{describe_device, describe_location, Accelerator, BackendStatus};
use crate::config::ProbeConfig;
use anyhow::{Context, Result};
use candle_core::{Device, DeviceLocation, Tensor};
use serde::Serialize;
use tracing::{debug, info};

pub const LIBRARY_NAME: &str = "candle-core";

/// Shape of the tensor allocated by the probe
pub const PROBE_SHAPE: (usize, usize) = (3, 3);

/// Version of candle-core this binary was built against
pub fn library_version() -> &'static str {
    env!("CANDLE_CORE_VERSION")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub library: &'static str,
    pub library_version: &'static str,
    pub probe_version: &'static str,
    /// Backend that was probed; None when only the CPU was requested
    pub accelerator: Option<Accelerator>,
    pub built: bool,
    pub available: bool,
    pub backends: Vec<BackendStatus>,
    pub selected_device: String,
    pub tensor_shape: Vec<usize>,
    pub tensor_dtype: &'static str,
    pub moved_device: Option<String>,
}

/// Run the smoke test once
pub fn run(config: &ProbeConfig) -> Result<ProbeReport> {
    info!(
        "[PROBE] {} v{} (choice: {}, ordinal: {})",
        LIBRARY_NAME,
        library_version(),
        config.choice,
        config.ordinal
    );

    let backends: Vec<BackendStatus> = Accelerator::ALL
        .iter()
        .map(|acc| acc.status(config.ordinal))
        .collect();
    for status in &backends {
        debug!("[PROBE] {:?}", status);
    }

    let accelerator = config.choice.target();
    let target = accelerator
        .and_then(|acc| backends.iter().find(|s| s.accelerator == acc).copied());
    let (built, available) = target.map_or((false, false), |s| (s.built, s.available));

    let tensor = Tensor::randn(0f32, 1f32, PROBE_SHAPE, &Device::Cpu)
        .context("Failed to create random tensor")?;
    info!("[PROBE] Created tensor with shape: {:?}", tensor.dims());

    let mut moved_device = None;
    let final_tensor = match transfer_target(target) {
        Some(acc) => {
            let device = acc.device(config.ordinal)?;
            let moved = tensor
                .to_device(&device)
                .with_context(|| format!("Failed to move tensor to {}", acc))?;
            check_transfer(moved.device().location(), device.location())?;
            info!("[PROBE] ✓ Moved tensor to {}", describe_device(moved.device()));
            moved_device = Some(describe_device(moved.device()));
            moved
        }
        None => {
            if let Some(acc) = accelerator {
                info!("[PROBE] {} not available, tensor stays on CPU", acc);
            }
            tensor
        }
    };

    Ok(ProbeReport {
        library: LIBRARY_NAME,
        library_version: library_version(),
        probe_version: crate::probe_version(),
        accelerator,
        built,
        available,
        backends,
        selected_device: describe_device(final_tensor.device()),
        tensor_shape: final_tensor.dims().to_vec(),
        tensor_dtype: final_tensor.dtype().as_str(),
        moved_device,
    })
}

/// The backend to move the tensor to: the probed one, and only if it is available
pub fn transfer_target(target: Option<BackendStatus>) -> Option<Accelerator> {
    target.filter(|s| s.available).map(|s| s.accelerator)
}

/// A moved tensor must report the device it was sent to
pub fn check_transfer(moved: DeviceLocation, expected: DeviceLocation) -> Result<()> {
    if moved != expected {
        anyhow::bail!(
            "Tensor reports device {} after transfer to {}",
            describe_location(moved),
            describe_location(expected)
        );
    }
    Ok(())
}

impl ProbeReport {
    /// Plain text report, one fact per line
    pub fn render_text(&self) -> String {
        let mut lines = vec![format!("{} version: {}", self.library, self.library_version)];
        match self.accelerator {
            Some(acc) => {
                lines.push(format!("{} available: {}", acc, self.available));
                lines.push(format!("{} built: {}", acc, self.built));
            }
            None => lines.push("Accelerator: none (CPU only)".to_string()),
        }
        lines.push(format!("Created tensor: {:?}", self.tensor_shape));
        if let (Some(acc), Some(device)) = (self.accelerator, &self.moved_device) {
            lines.push(format!("Moved tensor to {}: {}", acc, device));
        }
        lines.join("\n")
    }

    pub fn render_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize probe report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AcceleratorChoice;

    fn cpu_report() -> ProbeReport {
        ProbeReport {
            library: LIBRARY_NAME,
            library_version: "0.8.4",
            probe_version: "0.1.1",
            accelerator: Some(Accelerator::Metal),
            built: false,
            available: false,
            backends: vec![],
            selected_device: "Cpu".to_string(),
            tensor_shape: vec![3, 3],
            tensor_dtype: "f32",
            moved_device: None,
        }
    }

    #[test]
    fn test_library_version_non_empty() {
        assert!(!library_version().is_empty());
    }

    #[test]
    fn test_cpu_only_run() {
        let config = ProbeConfig {
            choice: AcceleratorChoice::Cpu,
            ..ProbeConfig::default()
        };
        let report = run(&config).unwrap();
        assert_eq!(report.accelerator, None);
        assert_eq!(report.tensor_shape, vec![3, 3]);
        assert_eq!(report.tensor_dtype, "f32");
        assert_eq!(report.selected_device, "Cpu");
        assert!(report.moved_device.is_none());
        assert_eq!(report.backends.len(), Accelerator::ALL.len());
        assert!(report.render_text().contains("Accelerator: none (CPU only)"));
    }

    #[test]
    fn test_render_text_without_transfer() {
        let text = cpu_report().render_text();
        assert_eq!(
            text,
            "candle-core version: 0.8.4\n\
             Metal available: false\n\
             Metal built: false\n\
             Created tensor: [3, 3]"
        );
    }

    #[test]
    fn test_render_text_with_transfer() {
        let mut report = cpu_report();
        report.built = true;
        report.available = true;
        report.moved_device = Some("Metal { registry_id: 4294968573 }".to_string());
        let text = report.render_text();
        assert!(text.ends_with("Moved tensor to Metal: Metal { registry_id: 4294968573 }"));
    }

    #[test]
    fn test_transfer_only_to_available_target() {
        let metal_down = BackendStatus {
            accelerator: Accelerator::Metal,
            built: true,
            available: false,
        };
        assert_eq!(transfer_target(Some(metal_down)), None);
        assert_eq!(transfer_target(None), None);

        let cuda_up = BackendStatus {
            accelerator: Accelerator::Cuda,
            built: true,
            available: true,
        };
        assert_eq!(transfer_target(Some(cuda_up)), Some(Accelerator::Cuda));
    }

    #[test]
    fn test_unavailable_target_is_not_replaced() {
        // An unavailable backend never hands the transfer to another one.
        for acc in Accelerator::ALL {
            if acc.is_available(0) {
                continue;
            }
            let config = ProbeConfig {
                choice: AcceleratorChoice::Only(acc),
                ..ProbeConfig::default()
            };
            let report = run(&config).unwrap();
            assert_eq!(report.accelerator, Some(acc));
            assert!(report.moved_device.is_none());
            assert_eq!(report.selected_device, "Cpu");
        }
    }

    #[test]
    fn test_check_transfer_match() {
        assert!(check_transfer(DeviceLocation::Cpu, DeviceLocation::Cpu).is_ok());
        assert!(check_transfer(
            DeviceLocation::Cuda { gpu_id: 1 },
            DeviceLocation::Cuda { gpu_id: 1 }
        )
        .is_ok());
    }

    #[test]
    fn test_check_transfer_mismatch() {
        let err = check_transfer(DeviceLocation::Cpu, DeviceLocation::Cuda { gpu_id: 0 })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tensor reports device Cpu after transfer to Cuda { gpu_id: 0 }"
        );
        assert!(check_transfer(
            DeviceLocation::Cuda { gpu_id: 0 },
            DeviceLocation::Cuda { gpu_id: 1 }
        )
        .is_err());
    }

    #[test]
    fn test_render_json() {
        let json = cpu_report().render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["accelerator"], "metal");
        assert_eq!(value["tensor_shape"], serde_json::json!([3, 3]));
        assert!(value["moved_device"].is_null());
    }
}
