/*
newsbrief - single-binary main.rs
Loads configuration, wires the article source and inference provider, then either
serves the briefing API or runs one briefing and prints it.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsbrief::models::StyleMode;
use newsbrief::processing::Briefing;
use newsbrief::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "newsbrief", about = "Tech news briefing server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Build one briefing, print it as JSON and exit instead of serving HTTP
    #[arg(long)]
    once: bool,

    /// Style used with --once (CEO or ENTHUSIAST)
    #[arg(long, default_value = "CEO")]
    style: String,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(defaults = ?default_path, override_file = ?override_path, "configuration loaded");

    // Missing credentials stop us here, before any network call
    let briefing = match Briefing::from_config(&config) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            error!(%e, "failed to initialize briefing pipeline");
            return Err(e.into());
        }
    };

    if args.once {
        let style: StyleMode = args.style.parse()?;
        info!(style = %style, "Running a single briefing");
        let response = briefing.generate(style).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    info!("Launching Rocket HTTP server");
    if let Err(e) = launch_rocket(AppState::new(briefing), &config.server()).await {
        error!(%e, "Rocket server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}
