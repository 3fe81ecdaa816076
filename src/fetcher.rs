// src/fetcher.rs

//! Metadata fetcher
//!
//! Turns a (name, version) pair into a resolved dependency record by
//! reading the package manifest and picking the dependency group nearest
//! to the caller's target framework.

use crate::error::{Error, Result};
use crate::framework::{FrameworkOracle, FrameworkReducer, TargetFramework};
use crate::manifest::Manifest;
use crate::model::{DependencyEdge, DependencyRecord, LibraryIdentity, LicenseObligation};
use crate::transport::ManifestTransport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything learned from one manifest fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMetadata {
    pub record: DependencyRecord,
    pub require_license_acceptance: bool,
    pub authors: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
}

impl FetchedMetadata {
    /// The license obligation this package imposes, if acceptance is required
    pub fn license_obligation(&self) -> Option<LicenseObligation> {
        self.require_license_acceptance.then(|| LicenseObligation {
            package: self.record.name().to_string(),
            license: self.license.clone(),
            license_url: self.license_url.clone(),
            authors: self.authors.clone(),
        })
    }
}

/// Fetches manifests and extracts framework-specific dependency lists
#[derive(Clone)]
pub struct MetadataFetcher {
    transport: Arc<dyn ManifestTransport>,
    oracle: Arc<dyn FrameworkOracle>,
}

impl MetadataFetcher {
    /// Create a fetcher using the default framework compatibility rules
    pub fn new(transport: Arc<dyn ManifestTransport>) -> Self {
        Self::with_oracle(transport, Arc::new(FrameworkReducer))
    }

    pub fn with_oracle(
        transport: Arc<dyn ManifestTransport>,
        oracle: Arc<dyn FrameworkOracle>,
    ) -> Self {
        Self { transport, oracle }
    }

    /// Identifier of the index behind this fetcher
    pub fn source(&self) -> &str {
        self.transport.source()
    }

    /// Fetch and interpret the manifest for `identity`
    pub async fn fetch(
        &self,
        identity: &LibraryIdentity,
        target_framework: &TargetFramework,
        cancel: &CancellationToken,
    ) -> Result<FetchedMetadata> {
        let bytes = self
            .transport
            .fetch_manifest(identity.name(), identity.version(), cancel)
            .await?;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled(format!("manifest fetch for {}", identity)));
        }

        let manifest = Manifest::parse(&bytes)?;
        let record = self.select_dependencies(identity, &manifest, target_framework);

        info!(
            "Fetched {} for {}: {} dependencies",
            identity,
            record.target_framework,
            record.dependencies.len()
        );

        Ok(FetchedMetadata {
            record,
            require_license_acceptance: manifest.require_license_acceptance,
            authors: manifest.authors.clone(),
            license: manifest.license.as_ref().map(|l| l.value.clone()),
            license_url: manifest.effective_license_url(),
        })
    }

    fn select_dependencies(
        &self,
        identity: &LibraryIdentity,
        manifest: &Manifest,
        target_framework: &TargetFramework,
    ) -> DependencyRecord {
        let frameworks = manifest.group_frameworks();

        let Some(index) = self.oracle.nearest(target_framework, &frameworks) else {
            debug!(
                "No dependency group of {} matches {}, using an empty agnostic group",
                identity, target_framework
            );
            return DependencyRecord::leaf(identity.clone(), TargetFramework::any());
        };

        let group = &manifest.dependency_groups[index];
        debug!(
            "Selected {} group of {} for {}",
            group.target_framework, identity, target_framework
        );

        DependencyRecord {
            identity: identity.clone(),
            resolved: true,
            target_framework: group.target_framework.clone(),
            dependencies: group
                .dependencies
                .iter()
                .map(|dep| DependencyEdge::new(dep.id.clone(), dep.range.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::PackageVersion;
    use async_trait::async_trait;

    struct StaticTransport(&'static str);

    #[async_trait]
    impl ManifestTransport for StaticTransport {
        async fn fetch_manifest(
            &self,
            _name: &str,
            _version: &PackageVersion,
            _cancel: &CancellationToken,
        ) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }

        fn source(&self) -> &str {
            "static"
        }
    }

    const MULTI_TARGET: &str = r#"<package><metadata>
        <id>Contoso.Lib</id><version>1.0.0</version>
        <authors>Contoso</authors>
        <requireLicenseAcceptance>true</requireLicenseAcceptance>
        <license type="expression">MIT</license>
        <dependencies>
          <group targetFramework="net45" />
          <group targetFramework="netstandard2.0">
            <dependency id="System.Memory" version="4.5.4" />
          </group>
          <group targetFramework="net6.0">
            <dependency id="Contoso.Core" version="[2.0.0, 3.0.0)" />
            <dependency id="Contoso.Abstractions" version="2.0.0" />
          </group>
        </dependencies>
    </metadata></package>"#;

    fn identity() -> LibraryIdentity {
        LibraryIdentity::new("Contoso.Lib", PackageVersion::new(1, 0, 0))
    }

    fn fetcher(xml: &'static str) -> MetadataFetcher {
        MetadataFetcher::new(Arc::new(StaticTransport(xml)))
    }

    #[tokio::test]
    async fn test_selects_nearest_group() {
        let fetched = fetcher(MULTI_TARGET)
            .fetch(
                &identity(),
                &TargetFramework::parse("net8.0").unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let record = &fetched.record;
        assert!(record.resolved);
        assert_eq!(record.target_framework.to_string(), "net6.0");
        let names: Vec<_> = record.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Contoso.Core", "Contoso.Abstractions"]);
        assert_eq!(record.dependencies[1].range.to_string(), ">= 2.0.0");
    }

    #[tokio::test]
    async fn test_falls_back_to_netstandard() {
        let fetched = fetcher(MULTI_TARGET)
            .fetch(
                &identity(),
                &TargetFramework::parse("netcoreapp3.1").unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(fetched.record.target_framework.to_string(), "netstandard2.0");
        assert_eq!(fetched.record.dependencies[0].name, "System.Memory");
    }

    #[tokio::test]
    async fn test_no_matching_group_yields_agnostic_leaf() {
        let xml = r#"<package><metadata><id>Old</id><version>1.0.0</version>
            <dependencies><group targetFramework="net45">
              <dependency id="X" version="1.0" />
            </group></dependencies></metadata></package>"#;
        let fetched = fetcher(xml)
            .fetch(
                &identity(),
                &TargetFramework::parse("net8.0").unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(fetched.record.target_framework.is_any());
        assert!(fetched.record.dependencies.is_empty());
        assert!(fetched.record.resolved);
    }

    #[tokio::test]
    async fn test_license_obligation() {
        let fetched = fetcher(MULTI_TARGET)
            .fetch(
                &identity(),
                &TargetFramework::parse("net8.0").unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        let obligation = fetched.license_obligation().unwrap();
        assert_eq!(obligation.package, "Contoso.Lib");
        assert_eq!(obligation.license.as_deref(), Some("MIT"));
        assert_eq!(
            obligation.license_url.as_deref(),
            Some("https://licenses.nuget.org/MIT")
        );
        assert_eq!(obligation.authors.as_deref(), Some("Contoso"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_fetch_failure() {
        let err = fetcher("<not-a-manifest")
            .fetch(
                &identity(),
                &TargetFramework::parse("net8.0").unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_cancelled_fetch() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = fetcher(MULTI_TARGET)
            .fetch(&identity(), &TargetFramework::any(), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
