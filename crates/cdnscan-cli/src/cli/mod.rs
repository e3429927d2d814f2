//! CLI for cdnscan.

mod commands;
mod http;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use cdnscan_core::config;
use clap::{Parser, Subcommand};

use commands::{run_resolve, run_serve};

/// Top-level CLI for cdnscan.
#[derive(Debug, Parser)]
#[command(name = "cdnscan")]
#[command(about = "cdnscan: find the live node of a sharded CDN", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/cdnscan/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the lookup endpoint (GET /api/scan?url=..&min=..&max=..).
    Serve {
        /// Address to bind, overriding `listen_addr` from the config.
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Resolve one URL and print the live node URL.
    Resolve {
        /// URL on the CDN domain, e.g. https://moveonjoy.com/ESPN/index.m3u8.
        url: String,

        /// First node index to probe (default from config).
        #[arg(long, value_name = "N")]
        min: Option<u32>,

        /// Last node index to probe (default from config).
        #[arg(long, value_name = "N")]
        max: Option<u32>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve { listen } => {
                run_serve(&cfg, listen.as_deref()).await?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Resolve { url, min, max } => run_resolve(&cfg, &url, min, max).await,
        }
    }
}

#[cfg(test)]
mod tests;
