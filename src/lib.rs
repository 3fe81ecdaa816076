// src/lib.rs

//! pkgdeps: dependency metadata provider
//!
//! Discovers the dependency edges of remote packages from their manifests
//! alone, so a graph-walking resolver can build a full dependency graph
//! without downloading package archives.
//!
//! # Architecture
//!
//! - Cache: process-wide, one record per package name, first insert wins
//! - Policy: a cached version at or above the request satisfies it; below is a conflict
//! - Fetcher: manifest → dependency group nearest to the target framework
//! - Batch: per-provider list of newly discovered packages and license obligations

pub mod cache;
pub mod config;
mod error;
pub mod fetcher;
pub mod framework;
pub mod manifest;
pub mod model;
pub mod provider;
pub mod transport;
pub mod version;

pub use cache::{CacheInsert, ResolutionCache};
pub use config::ProviderConfig;
pub use error::{Capability, Error, Result};
pub use fetcher::{FetchedMetadata, MetadataFetcher};
pub use framework::{FrameworkFamily, FrameworkOracle, FrameworkReducer, TargetFramework};
pub use manifest::{DependencyGroup, LicenseKind, LicenseMetadata, Manifest, ManifestDependency};
pub use model::{
    DependencyEdge, DependencyRecord, LibraryIdentity, LibraryKind, LibraryRange,
    LicenseObligation,
};
pub use provider::{
    DependencyProvider, GraphProvider, InstallBatch, PackageDownloader, Resolution,
    ResolutionOutcome, ResolutionPolicy, default_baseline_framework,
};
pub use transport::{manifest_url, HttpTransport, ManifestTransport};
pub use version::{PackageVersion, VersionRange};
