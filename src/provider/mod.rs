// src/provider/mod.rs

//! Dependency provider for graph-walking resolvers
//!
//! A walker asks a provider two questions: which identity satisfies a
//! requested range, and what that identity depends on. [`DependencyProvider`]
//! answers both from manifest metadata alone. It never serves package
//! content or version listings; those capabilities report
//! [`Error::UnsupportedOperation`].
//!
//! # Example
//!
//! ```ignore
//! let transport = Arc::new(HttpTransport::new("https://api.nuget.org/v3-flatcontainer")?);
//! let mut provider = DependencyProvider::new(ResolutionCache::global(), transport);
//! let tfm = TargetFramework::parse("net8.0")?;
//!
//! let identity = provider.find_identity(&LibraryRange::new("Serilog", VersionRange::parse("3.1.1")?), &tfm);
//! let record = provider.get_dependencies(&identity, &tfm, &CancellationToken::new()).await?;
//!
//! for obligation in provider.pending_licenses() {
//!     prompt_user(obligation);
//! }
//! provider.clear_batch(declined);
//! ```

mod batch;
mod policy;

pub use batch::InstallBatch;
pub use policy::{Resolution, ResolutionOutcome, ResolutionPolicy};

use crate::cache::ResolutionCache;
use crate::error::{Capability, Error, Result};
use crate::fetcher::MetadataFetcher;
use crate::framework::{FrameworkFamily, FrameworkOracle, TargetFramework};
use crate::model::{DependencyRecord, LibraryIdentity, LibraryRange, LicenseObligation};
use crate::transport::ManifestTransport;
use crate::version::PackageVersion;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Framework recorded on baseline-seeded packages
pub const DEFAULT_BASELINE_FRAMEWORK: &str = "net8.0";

/// [`DEFAULT_BASELINE_FRAMEWORK`] as a parsed moniker
pub fn default_baseline_framework() -> TargetFramework {
    TargetFramework::new(FrameworkFamily::Net, 8, 0)
}

/// Retrieves a package archive on behalf of a walker
#[async_trait]
pub trait PackageDownloader: Send + Sync {
    async fn download(&self, cancel: &CancellationToken) -> Result<Vec<u8>>;
}

/// Contract between a graph walker and a source of package metadata
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Identifier of the package source
    fn source(&self) -> &str;

    /// Whether answering queries may touch the network
    fn supports_network(&self) -> bool;

    /// Whether the source is reached over HTTP streams
    fn is_http(&self) -> bool;

    /// Capabilities this provider implements
    fn capabilities(&self) -> &[Capability];

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Map a requested range to a concrete identity
    fn find_identity(&self, range: &LibraryRange, target_framework: &TargetFramework)
        -> LibraryIdentity;

    /// Discover the dependencies of an identity
    async fn get_dependencies(
        &mut self,
        identity: &LibraryIdentity,
        target_framework: &TargetFramework,
        cancel: &CancellationToken,
    ) -> Result<Arc<DependencyRecord>>;

    async fn get_package_downloader(
        &self,
        _identity: &LibraryIdentity,
        _cancel: &CancellationToken,
    ) -> Result<Box<dyn PackageDownloader>> {
        Err(Error::UnsupportedOperation(Capability::ContentDownload))
    }

    async fn get_all_versions(
        &self,
        _name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<PackageVersion>> {
        Err(Error::UnsupportedOperation(Capability::VersionListing))
    }
}

/// Metadata-only provider backed by the shared resolution cache
pub struct DependencyProvider {
    policy: ResolutionPolicy,
    batch: InstallBatch,
}

impl DependencyProvider {
    /// Create a provider over `cache`, fetching manifests through `transport`
    pub fn new(cache: Arc<ResolutionCache>, transport: Arc<dyn ManifestTransport>) -> Self {
        Self::with_fetcher(cache, MetadataFetcher::new(transport))
    }

    /// Create a provider with a custom framework compatibility oracle
    pub fn with_oracle(
        cache: Arc<ResolutionCache>,
        transport: Arc<dyn ManifestTransport>,
        oracle: Arc<dyn FrameworkOracle>,
    ) -> Self {
        Self::with_fetcher(cache, MetadataFetcher::with_oracle(transport, oracle))
    }

    pub fn with_fetcher(cache: Arc<ResolutionCache>, fetcher: MetadataFetcher) -> Self {
        Self {
            policy: ResolutionPolicy::new(cache, fetcher),
            batch: InstallBatch::new(),
        }
    }

    /// Seed the process-wide cache with packages bundled in the host environment
    ///
    /// Call once before resolution begins. Records are tagged with the
    /// default baseline framework. Already-cached names are left as they
    /// are. Returns how many entries were added.
    pub fn seed_baseline<'a, I>(packages: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::seed_baseline_for(packages, &default_baseline_framework())
    }

    /// Seed the process-wide cache, tagging records with `framework`
    pub fn seed_baseline_for<'a, I>(packages: I, framework: &TargetFramework) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        ResolutionCache::global().seed_baseline(packages, framework)
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        self.policy.cache()
    }

    /// Resolve an identity, returning the outcome alongside the record
    ///
    /// The outcome is also folded into this provider's install batch.
    pub async fn resolve(
        &mut self,
        identity: &LibraryIdentity,
        target_framework: &TargetFramework,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        let resolution = self.policy.resolve(identity, target_framework, cancel).await?;
        self.batch.record(&resolution);
        Ok(resolution)
    }

    pub fn batch(&self) -> &InstallBatch {
        &self.batch
    }

    /// Packages discovered since the batch was last cleared
    pub fn pending_installs(&self) -> &[Arc<DependencyRecord>] {
        self.batch.pending_installs()
    }

    /// License terms awaiting user acceptance
    pub fn pending_licenses(&self) -> &[LicenseObligation] {
        self.batch.pending_licenses()
    }

    /// Clear the install batch; with `evict_from_cache`, also forget every
    /// batched package so the pass is rolled back
    pub fn clear_batch(&mut self, evict_from_cache: bool) -> usize {
        let cache = Arc::clone(self.policy.cache());
        self.batch.clear(&cache, evict_from_cache)
    }

    /// Hand the batch to an installer, leaving an empty one behind
    pub fn take_batch(&mut self) -> InstallBatch {
        self.batch.take()
    }
}

const CAPABILITIES: &[Capability] = &[Capability::IdentityLookup, Capability::DependencyLookup];

#[async_trait]
impl GraphProvider for DependencyProvider {
    fn source(&self) -> &str {
        self.policy.fetcher().source()
    }

    fn supports_network(&self) -> bool {
        true
    }

    fn is_http(&self) -> bool {
        true
    }

    fn capabilities(&self) -> &[Capability] {
        CAPABILITIES
    }

    /// Ranges are validated before they reach the walker, so the lower bound
    /// is taken as-is; an unbounded range maps to 0.0.0
    fn find_identity(
        &self,
        range: &LibraryRange,
        _target_framework: &TargetFramework,
    ) -> LibraryIdentity {
        let version = range
            .range
            .min_version()
            .cloned()
            .unwrap_or_else(|| PackageVersion::new(0, 0, 0));
        LibraryIdentity::new(range.name.clone(), version)
    }

    async fn get_dependencies(
        &mut self,
        identity: &LibraryIdentity,
        target_framework: &TargetFramework,
        cancel: &CancellationToken,
    ) -> Result<Arc<DependencyRecord>> {
        self.resolve(identity, target_framework, cancel)
            .await
            .map(|resolution| resolution.record)
    }
}
