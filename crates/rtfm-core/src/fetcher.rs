use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{Error, Result};

/// Transport used to download inventories.
///
/// Implementations report every failure (non-success status, connection
/// error, timeout) as [`Error::SourceUnavailable`].
#[async_trait]
pub trait InventoryFetch: Send + Sync {
    /// Download the raw bytes at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Location of the inventory file for a documentation root.
#[must_use]
pub fn inventory_url(base_url: &str) -> String {
    format!("{}/objects.inv", base_url.trim_end_matches('/'))
}

/// HTTP client for fetching `objects.inv` files
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a new fetcher with configured HTTP client
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Creates a new fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rtfm/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl InventoryFetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let unavailable = |reason: String| Error::SourceUnavailable {
            url: url.to_string(),
            reason,
        };

        debug!(%url, "requesting inventory");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        info!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

// Note: Default is not implemented as HttpFetcher::new() can fail.
