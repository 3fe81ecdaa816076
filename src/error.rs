// src/error.rs

//! Error types for dependency metadata resolution

use std::fmt;
use thiserror::Error;

/// Operations a graph-walking resolver may ask of a dependency provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Map a requested name and range to a concrete identity
    IdentityLookup,
    /// Discover the dependency edges of an identity
    DependencyLookup,
    /// Serve the package archive itself
    ContentDownload,
    /// Enumerate every published version of a package
    VersionListing,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::IdentityLookup => write!(f, "identity lookup"),
            Capability::DependencyLookup => write!(f, "dependency lookup"),
            Capability::ContentDownload => write!(f, "package content download"),
            Capability::VersionListing => write!(f, "version listing"),
        }
    }
}

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    /// A package is already resolved at a lower version than requested
    #[error(
        "Version conflict for {package}: {cached} is already resolved but {requested} was requested"
    )]
    VersionConflict {
        package: String,
        cached: String,
        requested: String,
    },

    /// The provider does not offer this capability
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(Capability),

    /// Transport failure while retrieving a manifest
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Malformed manifest, version, range or framework text
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The caller cancelled an in-flight fetch
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Failed to construct a component
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl Error {
    /// Whether this error belongs to the fetch-failure class
    ///
    /// Transport and manifest parse failures are both reported to the
    /// walker as a failed fetch.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::DownloadError(_) | Error::ParseError(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
