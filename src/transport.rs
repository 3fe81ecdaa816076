// src/transport.rs

//! Manifest transport
//!
//! Retrieves manifest documents from a flat-container style package index:
//! `{index}/{name}/{version}/{name}.{extension}`, all lower-cased. There are
//! no retries; a failed request is reported once.

use crate::error::{Error, Result};
use crate::version::PackageVersion;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default manifest file extension
pub const DEFAULT_MANIFEST_EXTENSION: &str = "manifest";

/// Largest manifest body accepted from an index
pub const MAX_MANIFEST_BYTES: usize = 16 * 1024 * 1024;

/// Upper bound on the buffer reserved from a declared Content-Length
const INITIAL_BODY_CAPACITY: usize = 64 * 1024;

/// Build the retrieval location of a package's manifest
pub fn manifest_url(index: &str, name: &str, version: &PackageVersion, extension: &str) -> String {
    let name = name.to_ascii_lowercase();
    format!(
        "{}/{}/{}/{}.{}",
        index.trim_end_matches('/'),
        name,
        version.normalized().to_ascii_lowercase(),
        name,
        extension.trim_start_matches('.')
    )
}

/// Source of raw manifest bytes
#[async_trait]
pub trait ManifestTransport: Send + Sync {
    /// Fetch the manifest of one package version
    ///
    /// Must stop reading and return [`Error::Cancelled`] once `cancel` fires.
    async fn fetch_manifest(
        &self,
        name: &str,
        version: &PackageVersion,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>>;

    /// Identifier of the index this transport reads from
    fn source(&self) -> &str;
}

#[async_trait]
impl<T: ManifestTransport + ?Sized> ManifestTransport for Arc<T> {
    async fn fetch_manifest(
        &self,
        name: &str,
        version: &PackageVersion,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        (**self).fetch_manifest(name, version, cancel).await
    }

    fn source(&self) -> &str {
        (**self).source()
    }
}

/// HTTP transport using reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    index_url: String,
    extension: String,
}

impl HttpTransport {
    /// Create a transport for the given index with default settings
    pub fn new(index_url: &str) -> Result<Self> {
        Self::with_options(
            index_url,
            DEFAULT_MANIFEST_EXTENSION,
            Duration::from_secs(30),
            concat!("pkgdeps/", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create with custom options
    pub fn with_options(
        index_url: &str,
        extension: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        url::Url::parse(index_url)
            .map_err(|e| Error::InitError(format!("Invalid index URL '{}': {e}", index_url)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            index_url: index_url.trim_end_matches('/').to_string(),
            extension: extension.to_string(),
        })
    }

    async fn read_manifest(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {}: {e}", url)))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let declared = response.content_length().unwrap_or(0);
        if declared > MAX_MANIFEST_BYTES as u64 {
            return Err(Error::DownloadError(format!(
                "Manifest at {} declares {} bytes, limit is {}",
                url, declared, MAX_MANIFEST_BYTES
            )));
        }

        let mut body = Vec::with_capacity((declared as usize).min(INITIAL_BODY_CAPACITY));
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::DownloadError(format!("Failed to read {}: {e}", url)))?
        {
            if body.len() + chunk.len() > MAX_MANIFEST_BYTES {
                return Err(Error::DownloadError(format!(
                    "Manifest at {} exceeds {} bytes",
                    url, MAX_MANIFEST_BYTES
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl ManifestTransport for HttpTransport {
    async fn fetch_manifest(
        &self,
        name: &str,
        version: &PackageVersion,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let url = manifest_url(&self.index_url, name, version, &self.extension);
        debug!("Fetching manifest {}", url);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled(format!("manifest fetch for {} {}", name, version))),
            body = self.read_manifest(&url) => body,
        }
    }

    fn source(&self) -> &str {
        &self.index_url
    }
}
