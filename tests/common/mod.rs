// tests/common/mod.rs

//! Shared test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pkgdeps::{
    DependencyProvider, DependencyRecord, Error, GraphProvider, LibraryRange, ManifestTransport,
    PackageVersion, ResolutionCache, Result, TargetFramework,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// In-memory index serving canned manifests and counting requests.
#[derive(Default)]
pub struct MockTransport {
    manifests: HashMap<(String, String), String>,
    requests: AtomicUsize,
    delay: Option<Duration>,
}

fn key(name: &str, version: &str) -> (String, String) {
    let version = PackageVersion::parse(version).unwrap();
    (name.to_ascii_lowercase(), version.normalized().to_ascii_lowercase())
}

/// Build a manifest with a single netstandard2.0 dependency group.
pub fn manifest_xml(name: &str, version: &str, deps: &[(&str, &str)]) -> String {
    let deps: String = deps
        .iter()
        .map(|(id, range)| format!(r#"<dependency id="{}" version="{}" />"#, id, range))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata>
    <id>{name}</id>
    <version>{version}</version>
    <authors>Test Authors</authors>
    <dependencies>
      <group targetFramework=".NETStandard2.0">{deps}</group>
    </dependencies>
  </metadata>
</package>"#
    )
}

/// Build a manifest that requires license acceptance.
pub fn licensed_manifest_xml(name: &str, version: &str, license: &str) -> String {
    format!(
        r#"<package><metadata>
    <id>{name}</id>
    <version>{version}</version>
    <authors>Contoso</authors>
    <requireLicenseAcceptance>true</requireLicenseAcceptance>
    <license type="expression">{license}</license>
  </metadata></package>"#
    )
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        self.manifests
            .insert(key(name, version), manifest_xml(name, version, deps));
        self
    }

    pub fn with_licensed_package(mut self, name: &str, version: &str, license: &str) -> Self {
        self.manifests
            .insert(key(name, version), licensed_manifest_xml(name, version, license));
        self
    }

    pub fn with_raw(mut self, name: &str, version: &str, xml: &str) -> Self {
        self.manifests.insert(key(name, version), xml.to_string());
        self
    }

    /// Hold every request for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestTransport for MockTransport {
    async fn fetch_manifest(
        &self,
        name: &str,
        version: &PackageVersion,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(Error::Cancelled(format!("{} {}", name, version)));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.manifests
            .get(&(name.to_ascii_lowercase(), version.normalized().to_ascii_lowercase()))
            .map(|xml| xml.as_bytes().to_vec())
            .ok_or_else(|| Error::DownloadError(format!("HTTP 404 Not Found for {} {}", name, version)))
    }

    fn source(&self) -> &str {
        "mock://index"
    }
}

pub fn netstandard() -> TargetFramework {
    TargetFramework::parse("netstandard2.0").unwrap()
}

pub fn version(s: &str) -> PackageVersion {
    PackageVersion::parse(s).unwrap()
}

/// A provider over a fresh cache, returning the cache and transport handles.
pub fn provider_with(
    transport: MockTransport,
) -> (DependencyProvider, Arc<ResolutionCache>, Arc<MockTransport>) {
    let cache = Arc::new(ResolutionCache::new());
    let transport = Arc::new(transport);
    let provider = DependencyProvider::new(Arc::clone(&cache), transport.clone());
    (provider, cache, transport)
}

/// Breadth-first walk that checks every edge, including repeats, against the provider.
pub async fn walk(
    provider: &mut DependencyProvider,
    root: &LibraryRange,
    tfm: &TargetFramework,
    cancel: &CancellationToken,
) -> Result<Vec<Arc<DependencyRecord>>> {
    let root = provider.find_identity(root, tfm);
    let mut seen = HashSet::from([root.name().to_ascii_lowercase()]);
    let mut queue = VecDeque::from([root]);
    let mut visited = Vec::new();

    while let Some(id) = queue.pop_front() {
        let record = provider.get_dependencies(&id, tfm, cancel).await?;
        for edge in &record.dependencies {
            let next = provider.find_identity(&edge.to_library_range(), tfm);
            if seen.insert(next.name().to_ascii_lowercase()) {
                queue.push_back(next);
            } else {
                provider.get_dependencies(&next, tfm, cancel).await?;
            }
        }
        visited.push(record);
    }
    Ok(visited)
}
