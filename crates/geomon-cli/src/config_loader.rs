//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use geomon_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no --config is given
const DEFAULT_CONFIG_FILE: &str = "geomon.toml";

/// Load layered configuration: defaults, file, environment
pub fn load_config(config_path: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = resolve_config_path(config_path) {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(config_path)?;
    config.update_from_cli(overrides);
    Ok(config)
}

/// An explicit path always wins; otherwise use ./geomon.toml if it exists
fn resolve_config_path(config_path: Option<&Path>) -> Option<PathBuf> {
    match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}
