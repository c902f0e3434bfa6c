//! Rapid Annotator - desktop client for a detection/OCR service
//!
//! Uploads an image with a class prompt, draws the returned boxes and text
//! over it with adjustable per-class thresholds, and summarizes class counts
//! for batches of images.

mod annotate;
mod api;
mod config;
mod dashboard;
mod storage;

use anyhow::Result;
use clap::Parser;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::AppConfig;
use crate::dashboard::Dispatcher;

/// Rapid Annotator - annotate images with a remote detection service
#[derive(Parser, Debug)]
#[command(name = "rapid-annotator")]
#[command(about = "Desktop client for a detection/OCR service")]
struct Args {
    /// Base URL of the detection service (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Class prompt to start with, e.g. "cat, dog"
    #[arg(long)]
    prompt: Option<String>,

    /// Image to upload on start-up
    #[arg(long)]
    image: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Rapid Annotator starting...");

    let mut config = load_or_create_config();
    apply_overrides(&mut config, &args);
    info!("Detection service: {}", config.server.base_url);

    let config = Arc::new(RwLock::new(config));
    let dispatcher = Dispatcher::new(config.clone())?;

    // Run the dashboard (blocking)
    if let Err(e) = dashboard::run_dashboard(config, dispatcher, args.image) {
        tracing::error!("Dashboard error: {}", e);
    }

    info!("Rapid Annotator shutdown complete");

    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_create_config() -> AppConfig {
    if let Ok(config_path) = storage::config_path() {
        if config_path.exists() {
            match config::load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring invalid configuration {:?}: {}", config_path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Command line flags win over the file for this run only
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(prompt) = &args.prompt {
        config.detection.default_prompt = prompt.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "rapid-annotator",
            "--server",
            "http://gpu-box:8095",
            "--prompt",
            "cat, dog",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.server.base_url, "http://gpu-box:8095");
        assert_eq!(config.detection.default_prompt, "cat, dog");
        assert_eq!(args.log_level, "info");
        assert!(args.image.is_none());
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["rapid-annotator", "--image", "street.jpg"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config, AppConfig::default());
        assert_eq!(args.image, Some(PathBuf::from("street.jpg")));
    }
}
