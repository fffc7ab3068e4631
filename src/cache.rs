//! Page cache used by the content fetcher.
//!
//! Entries never expire: once an address is written it is served from the
//! cache for this and every later run. [`FsCache`] mirrors the address path
//! under a root directory with the scheme prefix stripped.
//!
//! Path components longer than a filesystem name allows (long search query
//! strings, mostly) are split into nested directories of at most
//! [`MAX_NAME_BYTES`] bytes each.

use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Longest file name most filesystems accept
pub const MAX_NAME_BYTES: usize = 255;

/// Cache collaborator keyed by resource address
pub trait PageCache: Send + Sync {
    /// Cached content for `address`, or `None` on a miss
    fn read(&self, address: &str) -> Option<String>;

    /// Store content for `address`, overwriting any previous entry
    fn write(&self, address: &str, content: &str) -> Result<()>;
}

/// Filesystem cache mirroring address paths below a root directory
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for an address: scheme stripped, directory-style
    /// addresses stored as `index.html` inside that directory.
    pub fn path_for(&self, address: &str) -> PathBuf {
        let stripped = address
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(address);

        let mut path = self.root.clone();
        for segment in stripped.split('/').filter(|s| !s.is_empty()) {
            for chunk in name_chunks(segment) {
                path.push(chunk);
            }
        }
        if stripped.is_empty() || stripped.ends_with('/') {
            path.push("index.html");
        }
        path
    }
}

/// Split a path segment into pieces of at most [`MAX_NAME_BYTES`] bytes,
/// cutting on character boundaries.
fn name_chunks(segment: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = segment;
    while rest.len() > MAX_NAME_BYTES {
        let mut cut = MAX_NAME_BYTES;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}

impl PageCache for FsCache {
    fn read(&self, address: &str) -> Option<String> {
        let path = self.path_for(address);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cache miss");
                None
            }
        }
    }

    fn write(&self, address: &str, content: &str) -> Result<()> {
        let path = self.path_for(address);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "Cached page");
        Ok(())
    }
}

/// In-process cache, useful when nothing should touch the disk
#[derive(Debug, Default)]
pub struct MemoryCache {
    pages: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached addresses
    pub fn len(&self) -> usize {
        self.pages.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for MemoryCache {
    fn read(&self, address: &str) -> Option<String> {
        self.pages.lock().ok()?.get(address).cloned()
    }

    fn write(&self, address: &str, content: &str) -> Result<()> {
        if let Ok(mut pages) = self.pages.lock() {
            pages.insert(address.to_string(), content.to_string());
        }
        Ok(())
    }
}
