// src/commands/resolve.rs
//! Dependency graph walk

use anyhow::{anyhow, Context, Result};
use pkgdeps::{
    DependencyProvider, GraphProvider, LibraryRange, ProviderConfig, ResolutionCache,
    TargetFramework, VersionRange,
};
use super::walk::walk_graph;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Split a NAME=VERSION baseline argument
fn parse_baseline_arg(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .map(|(name, version)| (name.trim(), version.trim()))
        .filter(|(name, version)| !name.is_empty() && !version.is_empty())
        .ok_or_else(|| anyhow!("Baseline entry '{}' must look like NAME=VERSION", arg))
}

/// Resolve a package breadth-first and report the install batch
pub async fn cmd_resolve(
    config: &ProviderConfig,
    package: &str,
    version: Option<&str>,
    framework: Option<&str>,
    baseline: &[String],
    decline_licenses: bool,
) -> Result<()> {
    let target_framework = match framework {
        Some(tfm) => TargetFramework::parse(tfm)?,
        None => config.target_framework()?,
    };
    let range = VersionRange::parse(version.unwrap_or(""))
        .with_context(|| format!("Invalid version range for {}", package))?;

    let baseline_framework = config.baseline_framework()?;
    DependencyProvider::seed_baseline_for(config.baseline_packages(), &baseline_framework);
    let extra = baseline
        .iter()
        .map(|arg| parse_baseline_arg(arg))
        .collect::<Result<Vec<_>>>()?;
    DependencyProvider::seed_baseline_for(extra, &baseline_framework);

    let transport = Arc::new(config.http_transport()?);
    let mut provider = DependencyProvider::new(ResolutionCache::global(), transport);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    info!(
        "Resolving {} {} for {} from {}",
        package,
        range,
        target_framework,
        provider.source()
    );

    let visited = walk_graph(
        &mut provider,
        &LibraryRange::new(package, range),
        &target_framework,
        &cancel,
    )
    .await
    .with_context(|| format!("Failed to resolve the dependency graph of {}", package))?;
    debug!("Visited {} packages", visited.len());

    let installs = provider.pending_installs();
    if installs.is_empty() {
        println!("Nothing to install: all packages are already available.");
    } else {
        println!("Packages to install:");
        for record in installs {
            println!(
                "  {} {} [{}] ({} dependencies)",
                record.name(),
                record.version(),
                record.target_framework,
                record.dependencies.len()
            );
        }
        println!("\nTotal: {} package(s)", installs.len());
    }

    let licenses = provider.pending_licenses();
    if !licenses.is_empty() {
        println!("\nLicense acceptance required:");
        for obligation in licenses {
            println!("  {}", obligation);
        }

        if decline_licenses {
            let evicted = provider.clear_batch(true);
            println!("\nLicenses declined; rolled back {} package(s).", evicted);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_baseline_arg() {
        assert_eq!(
            parse_baseline_arg("Newtonsoft.Json=12.0.3").unwrap(),
            ("Newtonsoft.Json", "12.0.3")
        );
        assert!(parse_baseline_arg("Newtonsoft.Json").is_err());
        assert!(parse_baseline_arg("=1.0").is_err());
    }
}
