//! `cdnscan resolve` – one-shot lookup.

use std::process::ExitCode;

use anyhow::Result;
use cdnscan_core::config::ScanConfig;
use cdnscan_core::probe::CurlProbe;
use cdnscan_core::{RequestPolicy, Resolution, ResolutionEngine};

pub async fn run_resolve(
    cfg: &ScanConfig,
    url: &str,
    min: Option<u32>,
    max: Option<u32>,
) -> Result<ExitCode> {
    let min = min.map(|n| n.to_string());
    let max = max.map(|n| n.to_string());
    let request =
        RequestPolicy::from_config(cfg).admit(Some(url), min.as_deref(), max.as_deref())?;

    let engine = ResolutionEngine::from_config(cfg, CurlProbe::new())?;
    match engine.resolve(&request).await {
        Resolution::Found(found) => {
            println!("{}", found);
            Ok(ExitCode::SUCCESS)
        }
        Resolution::NotFound => {
            println!(
                "not found: no node in {}..={} answered",
                request.range_min(),
                request.range_max()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
