// SYNOID Tensor Probe Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use tensor_probe::backend::AcceleratorChoice;
use tensor_probe::config::{OutputFormat, ProbeConfig};
use tensor_probe::probe;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tensor-probe")]
#[command(about = "Smoke test for the candle tensor stack and its GPU backends", long_about = None)]
struct Cli {
    /// Accelerator to probe: auto, cpu, metal (mps) or cuda (gpu)
    #[arg(short, long)]
    accelerator: Option<AcceleratorChoice>,

    /// GPU device index
    #[arg(short, long)]
    ordinal: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenv().ok();

    // Logs go to stderr so stdout only carries the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PROBE PANIC] at {}: {}", location, message);
    }));

    let args = Cli::parse();
    let config = ProbeConfig::from_env().with_overrides(args.accelerator, args.ordinal, args.json);
    info!("--- SYNOID TENSOR PROBE v{} ---", tensor_probe::probe_version());

    let report = probe::run(&config)?;
    match config.output {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }

    info!("[PROBE] Tensor test completed successfully");
    Ok(())
}
