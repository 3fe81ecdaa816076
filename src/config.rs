// src/config.rs

//! Provider configuration
//!
//! TOML file with the following sections:
//! - [index] - Package index location and HTTP settings
//! - [resolution] - Target and baseline frameworks
//! - [baseline] - Packages bundled with the host, name = "version"

use crate::error::{Error, Result};
use crate::framework::TargetFramework;
use crate::provider::DEFAULT_BASELINE_FRAMEWORK;
use crate::transport::{HttpTransport, DEFAULT_MANIFEST_EXTENSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub index: IndexSection,

    #[serde(default)]
    pub resolution: ResolutionSection,

    /// Packages already present in the host environment
    #[serde(default)]
    pub baseline: BTreeMap<String, String>,
}

/// Package index settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSection {
    /// Base URL of the flat-container index
    #[serde(default = "default_index_url")]
    pub url: String,

    /// Extension of manifest documents
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            manifest_extension: default_manifest_extension(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Framework settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSection {
    /// Framework dependency groups are selected for
    #[serde(default = "default_framework")]
    pub target_framework: String,

    /// Framework recorded on baseline-seeded packages
    #[serde(default = "default_framework")]
    pub baseline_framework: String,
}

impl Default for ResolutionSection {
    fn default() -> Self {
        Self {
            target_framework: default_framework(),
            baseline_framework: default_framework(),
        }
    }
}

fn default_index_url() -> String {
    "https://api.nuget.org/v3-flatcontainer".to_string()
}

fn default_manifest_extension() -> String {
    DEFAULT_MANIFEST_EXTENSION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("pkgdeps/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_framework() -> String {
    DEFAULT_BASELINE_FRAMEWORK.to_string()
}

impl ProviderConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.index.url).map_err(|e| {
            Error::ConfigError(format!("Invalid index url '{}': {}", self.index.url, e))
        })?;
        if self.index.timeout_secs == 0 {
            return Err(Error::ConfigError("timeout_secs must be positive".to_string()));
        }
        self.target_framework()?;
        self.baseline_framework()?;
        Ok(())
    }

    pub fn target_framework(&self) -> Result<TargetFramework> {
        TargetFramework::parse(&self.resolution.target_framework)
    }

    pub fn baseline_framework(&self) -> Result<TargetFramework> {
        TargetFramework::parse(&self.resolution.baseline_framework)
    }

    /// Baseline packages as borrowed (name, version) pairs
    pub fn baseline_packages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.baseline
            .iter()
            .map(|(name, version)| (name.as_str(), version.as_str()))
    }

    /// Build the HTTP transport described by the [index] section
    pub fn http_transport(&self) -> Result<HttpTransport> {
        HttpTransport::with_options(
            &self.index.url,
            &self.index.manifest_extension,
            Duration::from_secs(self.index.timeout_secs),
            &self.index.user_agent,
        )
    }
}
