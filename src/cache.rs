// src/cache.rs

//! Process-wide dependency record cache
//!
//! Holds at most one record per package name. Names are compared
//! case-insensitively, matching how the package index treats identifiers.
//! Inserts are "add if absent": the first writer for a name wins and every
//! later writer gets the winner's record back.

use crate::framework::TargetFramework;
use crate::model::{DependencyRecord, LibraryIdentity};
use crate::version::PackageVersion;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

/// Result of an insert-if-absent
#[derive(Debug, Clone)]
pub struct CacheInsert {
    /// The record now held for the name
    pub record: Arc<DependencyRecord>,
    /// Whether this call stored it (false: an earlier entry won)
    pub inserted: bool,
}

/// Concurrent name → record map
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<String, Arc<DependencyRecord>>,
}

/// Shared process-wide instance
static GLOBAL_CACHE: LazyLock<Arc<ResolutionCache>> =
    LazyLock::new(|| Arc::new(ResolutionCache::new()));

fn cache_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide cache shared by every provider that does not bring its own
    pub fn global() -> Arc<ResolutionCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Look up the record for a package name
    pub fn get(&self, name: &str) -> Option<Arc<DependencyRecord>> {
        self.entries
            .get(&cache_key(name))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&cache_key(name))
    }

    /// Store a record unless one already exists for its name
    pub fn insert_if_absent(&self, record: DependencyRecord) -> CacheInsert {
        match self.entries.entry(cache_key(record.name())) {
            Entry::Occupied(existing) => {
                debug!(
                    "Discarding {} {}: {} already cached",
                    record.name(),
                    record.version(),
                    existing.get().version()
                );
                CacheInsert {
                    record: Arc::clone(existing.get()),
                    inserted: false,
                }
            }
            Entry::Vacant(slot) => {
                let record = Arc::new(record);
                slot.insert(Arc::clone(&record));
                CacheInsert {
                    record,
                    inserted: true,
                }
            }
        }
    }

    /// Remove a package's record; returns it if one was held
    pub fn evict(&self, name: &str) -> Option<Arc<DependencyRecord>> {
        self.entries.remove(&cache_key(name)).map(|(_, record)| record)
    }

    /// Seed pre-resolved, dependency-free records for packages already
    /// present in the host environment
    ///
    /// Names that are already cached keep their existing record. Returns how
    /// many entries were added. Unparseable versions are skipped with a
    /// warning.
    pub fn seed_baseline<'a, I>(&self, packages: I, framework: &TargetFramework) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut added = 0;
        for (name, version) in packages {
            let version = match PackageVersion::parse(version) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Skipping baseline package {}: {}", name, e);
                    continue;
                }
            };
            let record =
                DependencyRecord::leaf(LibraryIdentity::new(name, version), framework.clone());
            if self.insert_if_absent(record).inserted {
                added += 1;
            }
        }
        info!("Seeded {} baseline packages ({} cached)", added, self.len());
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name → version listing of every cached record, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| {
                let record = entry.value();
                (record.name().to_string(), record.version().to_string())
            })
            .collect()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
