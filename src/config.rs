//! Run configuration.
//!
//! All markers and address templates the extraction stages depend on live
//! here instead of in module constants, so fixtures can point the miners at
//! anything. A config file is plain JSON; missing fields take their defaults.

use crate::error::{MinerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default on-disk cache root
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Default number of citing documents visited per resolved title
pub const DEFAULT_MAX_CITING_DOCUMENTS: usize = 2;

/// Top-level configuration shared by the fetcher and both miners
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MinerConfig {
    /// Page cache settings
    pub cache: CacheConfig,
    /// HTTP client settings
    pub http: HttpConfig,
    /// DBLP markers and templates
    pub dblp: DblpConfig,
    /// CiteSeer markers and templates
    pub citeseer: CiteSeerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root directory mirroring fetched addresses
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 30,
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DblpConfig {
    /// Conference index page; `{name}` is replaced by the conference identifier
    pub index_url_format: String,
    /// Icon that flags a block as a year entry
    pub year_flag_icon: String,
    /// CSS selector for the candidate year blocks
    pub year_block_selector: String,
    /// Visible text marking a link to a paper's XML record
    pub paper_link_marker: String,
}

impl Default for DblpConfig {
    fn default() -> Self {
        Self {
            index_url_format: "http://www.informatik.uni-trier.de/~ley/db/conf/{name}/index.html"
                .to_string(),
            year_flag_icon: "http://dblp.uni-trier.de/img/venues.dark.hollow.16x16.png".to_string(),
            year_block_selector: "div.head".to_string(),
            paper_link_marker: "XML".to_string(),
        }
    }
}

impl DblpConfig {
    /// Index page address for a conference identifier
    pub fn index_url(&self, conference: &str) -> String {
        self.index_url_format.replace("{name}", conference)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiteSeerConfig {
    /// Scheme and host; relative links on CiteSeer pages are resolved against it
    pub domain: String,
    /// Search path; `{title}` is replaced by the form-encoded title
    pub search_path_format: String,
    /// Path segment identifying links to citing documents
    pub document_link_marker: String,
    pub max_citing_documents: usize,
    /// Label preceding the author list on a document page
    pub author_label: String,
}

impl Default for CiteSeerConfig {
    fn default() -> Self {
        Self {
            domain: "http://citeseer.ist.psu.edu".to_string(),
            search_path_format: "/search?q=title%3A%28{title}%29&sort=cite&t=doc".to_string(),
            document_link_marker: "/viewdoc/".to_string(),
            max_citing_documents: DEFAULT_MAX_CITING_DOCUMENTS,
            author_label: "by".to_string(),
        }
    }
}

impl CiteSeerConfig {
    /// Search page address for an already normalized title
    pub fn search_url(&self, title: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(title.as_bytes()).collect();
        format!(
            "{}{}",
            self.domain,
            self.search_path_format.replace("{title}", &encoded)
        )
    }

    /// Resolve a site-relative link against the configured domain
    pub fn absolute(&self, href: &str) -> String {
        if href.contains("://") {
            href.to_string()
        } else {
            format!("{}{}", self.domain, href)
        }
    }
}

impl MinerConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MinerError::Config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MinerError::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}
