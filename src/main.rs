//! llmgate - LLM gateway admission and resilience service
//!
//! Loads configuration, assembles the gateway and runs until interrupted.

#![allow(missing_docs)]

use clap::Parser;
use llmgate::utils::logging::init_logging;
use llmgate::{Config, Gateway};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "LLM gateway admission and resilience service")]
struct Cli {
    /// YAML configuration file; environment variables override its values
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Create the default model set before serving
    #[arg(long)]
    seed: bool,

    /// Log level or filter directive, overriding the configured one
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = cli.log_level {
        config.gateway.logging.level = level;
    }
    if cli.seed {
        config.gateway.seed.enabled = true;
    }

    if let Err(e) = init_logging(config.logging()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting {} v{}", llmgate::NAME, llmgate::VERSION);
    let gateway = match Gateway::new(config).await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Failed to start gateway: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    gateway.shutdown().await;
    ExitCode::SUCCESS
}
