//! Manga library server binary.

use anyhow::{Context, Result};
use clap::Parser;
use shared::Config;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.write_default_config {
        Config::default()
            .save(&args.config)
            .with_context(|| format!("Failed to write config to {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration (file, then environment overrides)
    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Initialize logging
    let mut log_config = shared::LogConfig::from_settings(
        &config.logging,
        &config.log_dir(),
        "library-server",
    );
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("Library server starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    library_server::run_server(config).await
}
