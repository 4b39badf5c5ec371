//! Subcommand implementations

pub mod config;
pub mod demo;

use anyhow::{Context, Result};
use ballot_core::config::DEFAULT_CONFIG_FILE;
use ballot_core::ClientConfig;
use std::path::{Path, PathBuf};

/// Defaults, then the config file, then `BALLOT_*` variables
///
/// An explicit `path` must exist. Without one, `ballot.toml` in the working
/// directory is read only if present.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    match &path {
        Some(path) => ClientConfig::resolve(Some(path.as_path()))
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => ClientConfig::resolve(None).context("loading default configuration"),
    }
}
