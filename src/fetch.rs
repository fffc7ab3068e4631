//! Content fetching: read-through, write-through cache in front of the network.
//!
//! A cache miss is the normal case and never an error. Network failures are
//! returned to the caller untouched and never retried.

use crate::cache::PageCache;
use crate::config::HttpConfig;
use crate::error::{MinerError, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Network collaborator: raw text at an address.
pub trait Transport: Send + Sync {
    fn get<'a>(
        &'a self,
        address: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs));

    if let Some(proxy_url) = config.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            MinerError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| MinerError::Config(format!("Failed to build HTTP client: {}", e)))
}

impl Transport for HttpTransport {
    fn get<'a>(
        &'a self,
        address: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(address)
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.9")
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(MinerError::Http {
                    status: status.as_u16(),
                    address: address.to_string(),
                });
            }

            Ok(response.text().await?)
        })
    }
}

/// Resolves addresses to text, consulting the cache before the network
#[derive(Clone)]
pub struct ContentFetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn PageCache>,
}

impl ContentFetcher {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<dyn PageCache>) -> Self {
        Self { transport, cache }
    }

    /// Fetch the content at `address`.
    ///
    /// Empty cache entries are treated as misses. Every network read is
    /// written back to the cache; a failed cache write is only logged.
    pub async fn fetch(&self, address: &str) -> Result<String> {
        if let Some(content) = self.cache.read(address).filter(|c| !c.is_empty()) {
            debug!(address, "reading (cache)");
            return Ok(content);
        }

        info!(address, "reading (web)");
        let content = self.transport.get(address).await?;

        if let Err(e) = self.cache.write(address, &content) {
            warn!(address, error = %e, "Failed to cache page");
        }

        Ok(content)
    }
}
