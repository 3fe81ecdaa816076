// src/commands/inspect.rs
//! Manifest inspection

use anyhow::{Context, Result};
use pkgdeps::{Manifest, ManifestTransport, PackageVersion, ProviderConfig};
use tokio_util::sync::CancellationToken;

/// Print the dependency groups and license data of one package version
pub async fn cmd_inspect(config: &ProviderConfig, package: &str, version: &str) -> Result<()> {
    let version = PackageVersion::parse(version)?;
    let transport = config.http_transport()?;

    let bytes = transport
        .fetch_manifest(package, &version, &CancellationToken::new())
        .await
        .with_context(|| format!("Failed to fetch manifest for {} {}", package, version))?;
    let manifest = Manifest::parse(&bytes)?;

    println!("{} {}", manifest.id, manifest.version);
    if let Some(authors) = &manifest.authors {
        println!("  Authors: {}", authors);
    }
    if let Some(license) = &manifest.license {
        println!("  License: {} ({:?})", license.value, license.kind);
    }
    if let Some(url) = manifest.effective_license_url() {
        println!("  License URL: {}", url);
    }
    println!(
        "  Requires license acceptance: {}",
        if manifest.require_license_acceptance { "yes" } else { "no" }
    );

    if manifest.dependency_groups.is_empty() {
        println!("  No dependencies.");
    }
    for group in &manifest.dependency_groups {
        println!("  [{}]", group.target_framework);
        if group.dependencies.is_empty() {
            println!("    (none)");
        }
        for dep in &group.dependencies {
            println!("    {} {}", dep.id, dep.range);
        }
    }

    Ok(())
}
