// src/commands/mod.rs
//! Command handlers for the pkgdeps CLI

mod inspect;
mod resolve;
mod walk;

pub use inspect::cmd_inspect;
pub use resolve::cmd_resolve;

use anyhow::{Context, Result};
use pkgdeps::ProviderConfig;
use std::path::Path;

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&str>) -> Result<ProviderConfig> {
    match path {
        Some(path) => ProviderConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None => Ok(ProviderConfig::default()),
    }
}
