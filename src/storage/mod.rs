//! Storage Layer
//!
//! Locates the configuration and data directories and writes exported
//! annotations.

pub mod export;

use anyhow::Result;
use std::path::PathBuf;

pub use export::export_annotated;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "rapidannotator", "RapidAnnotator")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Path of the settings file
pub fn config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}
