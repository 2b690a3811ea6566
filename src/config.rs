// src/config.rs

//! Configuration loading for the service binary.
//!
//! Combines the TOML file, environment overrides and validation into one
//! call.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Load the configuration file, falling back to defaults when it is missing
/// or unreadable, then apply environment overrides.
pub fn load_config(path: &Path) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config
}

/// Load, override and validate.
pub fn load_validated(path: &Path) -> Result<Config> {
    let config = load_config(path);
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration in {path:?}: {e}")))?;
    Ok(config)
}
