//! Command-line surface of the `dataset-builder` binary

use crate::config::{create_config_template, load_config, DatasetConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG: &str = "dataset.toml";

#[derive(Debug, Parser)]
#[command(name = "dataset-builder")]
#[command(about = "Build announcement-window datasets from index prices, ECB rates and sentiment scores")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Build every dataset described by the config
    Run {
        /// Config file; built-in defaults apply when it does not exist
        #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Write a commented config template
    Init {
        /// Where to write the template; an existing file is left alone
        #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

/// Config for `run` plus the directory its relative paths resolve against.
///
/// A missing file yields the built-in defaults. The base directory is the
/// file's parent, or `.` for a bare file name.
pub fn resolve_run(config_path: &Path) -> Result<(DatasetConfig, PathBuf)> {
    let config = if config_path.exists() {
        load_config(&config_path.to_string_lossy())
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        warn!(path = %config_path.display(), "Config file not found, using built-in defaults");
        DatasetConfig::default()
    };

    let base_dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((config, base_dir))
}

/// Write the config template, refusing to overwrite an existing file
pub fn init_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }
    create_config_template(&config_path.to_string_lossy())?;
    info!(path = %config_path.display(), "Config template written");
    Ok(())
}
