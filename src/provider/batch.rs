// src/provider/batch.rs

//! Install batch tracking
//!
//! Accumulates the packages a resolution pass discovered for the first
//! time, plus the license terms among them that need explicit acceptance.
//! The batch belongs to one provider instance and is not shared.

use crate::cache::ResolutionCache;
use crate::model::{DependencyRecord, LicenseObligation};
use crate::provider::policy::{Resolution, ResolutionOutcome};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct InstallBatch {
    pending_installs: Vec<Arc<DependencyRecord>>,
    pending_licenses: Vec<LicenseObligation>,
}

impl InstallBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a resolution into the batch
    ///
    /// Only resolutions that stored a new cache entry are recorded.
    pub fn record(&mut self, resolution: &Resolution) {
        if let ResolutionOutcome::Fetched { license } = &resolution.outcome {
            self.pending_installs.push(Arc::clone(&resolution.record));
            if let Some(obligation) = license {
                self.pending_licenses.push(obligation.clone());
            }
        }
    }

    /// Records discovered since the last clear, in resolution order
    pub fn pending_installs(&self) -> &[Arc<DependencyRecord>] {
        &self.pending_installs
    }

    pub fn pending_licenses(&self) -> &[LicenseObligation] {
        &self.pending_licenses
    }

    pub fn is_empty(&self) -> bool {
        self.pending_installs.is_empty() && self.pending_licenses.is_empty()
    }

    /// Drain the batch, leaving it empty
    pub fn take(&mut self) -> InstallBatch {
        std::mem::take(self)
    }

    /// Empty the batch, optionally evicting its packages from `cache`
    ///
    /// Eviction rolls back a pass that will not be committed: afterwards the
    /// evicted names resolve through a fresh fetch. Returns the number of
    /// cache entries removed.
    pub fn clear(&mut self, cache: &ResolutionCache, evict_from_cache: bool) -> usize {
        let cleared = self.take();
        if !evict_from_cache {
            return 0;
        }

        let evicted = cleared
            .pending_installs
            .iter()
            .filter(|record| cache.evict(record.name()).is_some())
            .count();
        info!(
            "Rolled back {} of {} pending packages from the cache",
            evicted,
            cleared.pending_installs.len()
        );
        evicted
    }
}
