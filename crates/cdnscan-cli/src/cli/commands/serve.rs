//! `cdnscan serve` – run the HTTP lookup endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use cdnscan_core::config::ScanConfig;
use cdnscan_core::probe::CurlProbe;
use cdnscan_core::{RequestPolicy, ResolutionEngine};

use crate::cli::http::{self, AppState};

pub async fn run_serve(cfg: &ScanConfig, listen: Option<&str>) -> Result<()> {
    let addr = listen.unwrap_or(cfg.listen_addr.as_str());
    let engine = Arc::new(ResolutionEngine::from_config(cfg, CurlProbe::new())?);
    let state = AppState::new(engine, RequestPolicy::from_config(cfg));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(
        template = %cfg.host_template,
        timeout_ms = cfg.probe_timeout_ms,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(
        listener,
        http::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
    })
    .await
    .context("serving lookup endpoint")?;
    Ok(())
}
