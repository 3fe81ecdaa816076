// src/provider/policy.rs

//! Resolution policy
//!
//! Decides whether a requested identity is served from the cache, fetched,
//! or rejected. The rule is one-directional: a cached version at or above
//! the request satisfies it, a cached version below the request is a
//! conflict. Nothing is ever re-resolved to a different version.

use crate::cache::ResolutionCache;
use crate::error::{Error, Result};
use crate::fetcher::MetadataFetcher;
use crate::framework::TargetFramework;
use crate::model::{DependencyRecord, LibraryIdentity, LicenseObligation};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a resolution was satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Served from an existing cache entry without a fetch
    Cached,
    /// Fetched and stored by this call
    Fetched {
        /// License terms the user must accept before installing
        license: Option<LicenseObligation>,
    },
    /// Fetched, but a concurrent resolution stored its record first
    Superseded,
}

/// A resolved record plus how it was obtained
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: Arc<DependencyRecord>,
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    /// Whether this call introduced the package into the cache
    pub fn is_new(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Fetched { .. })
    }
}

/// Cache-first resolution with first-insert-wins commits
#[derive(Clone)]
pub struct ResolutionPolicy {
    cache: Arc<ResolutionCache>,
    fetcher: MetadataFetcher,
}

impl ResolutionPolicy {
    pub fn new(cache: Arc<ResolutionCache>, fetcher: MetadataFetcher) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &MetadataFetcher {
        &self.fetcher
    }

    /// Check a cached record against a requested identity
    fn check_cached(
        cached: Arc<DependencyRecord>,
        identity: &LibraryIdentity,
    ) -> Result<Resolution> {
        if cached.version() >= identity.version() {
            debug!(
                "Cache hit for {}: {} satisfies {}",
                identity.name(),
                cached.version(),
                identity.version()
            );
            return Ok(Resolution {
                record: cached,
                outcome: ResolutionOutcome::Cached,
            });
        }

        warn!(
            "Version conflict for {}: cached {} is below requested {}",
            identity.name(),
            cached.version(),
            identity.version()
        );
        Err(Error::VersionConflict {
            package: identity.name().to_string(),
            cached: cached.version().to_string(),
            requested: identity.version().to_string(),
        })
    }

    /// Resolve an identity to its dependency record
    ///
    /// A cancelled or failed fetch leaves the cache untouched.
    pub async fn resolve(
        &self,
        identity: &LibraryIdentity,
        target_framework: &TargetFramework,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        if let Some(cached) = self.cache.get(identity.name()) {
            return Self::check_cached(cached, identity);
        }

        debug!("Cache miss for {}, fetching", identity);
        let fetched = self.fetcher.fetch(identity, target_framework, cancel).await?;
        let license = fetched.license_obligation();

        let insert = self.cache.insert_if_absent(fetched.record);
        if !insert.inserted {
            info!(
                "{} was resolved concurrently at {}; using the existing record",
                identity.name(),
                insert.record.version()
            );
            return Ok(Resolution {
                record: insert.record,
                outcome: ResolutionOutcome::Superseded,
            });
        }

        Ok(Resolution {
            record: insert.record,
            outcome: ResolutionOutcome::Fetched { license },
        })
    }
}
