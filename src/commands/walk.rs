// src/commands/walk.rs

//! Breadth-first dependency graph walk
//!
//! Every edge is checked against the provider, including edges to names
//! already queued or visited. A repeat edge that asks for more than the
//! cached version therefore surfaces as a version conflict instead of being
//! skipped.

use pkgdeps::{DependencyRecord, GraphProvider, LibraryRange, Result, TargetFramework};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Walk the graph rooted at `root`, returning every record visited in
/// breadth-first order
pub async fn walk_graph<P>(
    provider: &mut P,
    root: &LibraryRange,
    target_framework: &TargetFramework,
    cancel: &CancellationToken,
) -> Result<Vec<Arc<DependencyRecord>>>
where
    P: GraphProvider + ?Sized,
{
    let root = provider.find_identity(root, target_framework);
    let mut seen: HashSet<String> = HashSet::from([root.name().to_ascii_lowercase()]);
    let mut queue = VecDeque::from([root]);
    let mut visited = Vec::new();

    while let Some(identity) = queue.pop_front() {
        let record = provider
            .get_dependencies(&identity, target_framework, cancel)
            .await?;
        debug!("{} has {} dependencies", record.identity, record.dependencies.len());

        for edge in &record.dependencies {
            let next = provider.find_identity(&edge.to_library_range(), target_framework);
            if seen.insert(next.name().to_ascii_lowercase()) {
                queue.push_back(next);
            } else {
                // Already known: still check the requested version against the cache
                provider
                    .get_dependencies(&next, target_framework, cancel)
                    .await?;
            }
        }

        visited.push(record);
    }

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pkgdeps::{
        DependencyProvider, Error, ManifestTransport, PackageVersion, ResolutionCache,
        VersionRange,
    };
    use std::collections::HashMap;

    /// Index answering from a fixed name/version table
    struct FixedIndex(HashMap<(String, String), String>);

    impl FixedIndex {
        fn new(packages: &[(&str, &str, &[(&str, &str)])]) -> Self {
            let manifests = packages
                .iter()
                .map(|(name, version, deps)| {
                    let deps: String = deps
                        .iter()
                        .map(|(id, range)| format!(r#"<dependency id="{id}" version="{range}" />"#))
                        .collect();
                    let xml = format!(
                        r#"<package><metadata><id>{name}</id><version>{version}</version>
                        <dependencies><group targetFramework="netstandard2.0">{deps}</group></dependencies>
                        </metadata></package>"#
                    );
                    ((name.to_ascii_lowercase(), version.to_string()), xml)
                })
                .collect();
            Self(manifests)
        }
    }

    #[async_trait]
    impl ManifestTransport for FixedIndex {
        async fn fetch_manifest(
            &self,
            name: &str,
            version: &PackageVersion,
            _cancel: &CancellationToken,
        ) -> Result<Vec<u8>> {
            self.0
                .get(&(name.to_ascii_lowercase(), version.normalized()))
                .map(|xml| xml.as_bytes().to_vec())
                .ok_or_else(|| Error::DownloadError(format!("{} {} not found", name, version)))
        }

        fn source(&self) -> &str {
            "fixed://index"
        }
    }

    fn provider_over(packages: &[(&str, &str, &[(&str, &str)])]) -> DependencyProvider {
        DependencyProvider::new(
            Arc::new(ResolutionCache::new()),
            Arc::new(FixedIndex::new(packages)),
        )
    }

    fn root(name: &str) -> LibraryRange {
        LibraryRange::new(name, VersionRange::parse("1.0.0").unwrap())
    }

    fn netstandard() -> TargetFramework {
        TargetFramework::parse("netstandard2.0").unwrap()
    }

    #[tokio::test]
    async fn test_later_edge_asking_for_more_conflicts() {
        let mut provider = provider_over(&[
            ("App", "1.0.0", &[("Lib.Json", "12.0.0"), ("Lib.Log", "1.0.0")]),
            ("Lib.Log", "1.0.0", &[("Lib.Json", "13.0.0")]),
            ("Lib.Json", "12.0.0", &[]),
            ("Lib.Json", "13.0.0", &[]),
        ]);

        let err = walk_graph(
            &mut provider,
            &root("App"),
            &netstandard(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::VersionConflict { ref package, .. } if package == "Lib.Json"
        ));
    }

    #[tokio::test]
    async fn test_repeat_edge_within_cached_version_is_accepted() {
        let mut provider = provider_over(&[
            ("App", "1.0.0", &[("Lib.Json", "13.0.0"), ("Lib.Log", "1.0.0")]),
            ("Lib.Log", "1.0.0", &[("Lib.Json", "12.0.0")]),
            ("Lib.Json", "13.0.0", &[]),
        ]);

        let visited = walk_graph(
            &mut provider,
            &root("App"),
            &netstandard(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let names: Vec<_> = visited.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["App", "Lib.Json", "Lib.Log"]);
        assert_eq!(provider.pending_installs().len(), 3);
    }
}
