//! # bibminer
//!
//! Mines paper records from DBLP conference pages and, optionally, the
//! authors of papers citing them from CiteSeer.
//!
//! ## Modules
//!
//! - [`dblp`] - conference index -> year pages -> paper XML -> records
//! - [`citeseer`] - title search, fuzzy match and citing-author extraction
//! - [`harvest`] - run orchestration and JSON Lines output
//! - [`fetch`] - cached content fetching over HTTP
//! - [`cache`] - page cache backends
//! - [`config`] - run configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bibminer::cache::FsCache;
//! use bibminer::citeseer::CiteSeerMiner;
//! use bibminer::config::MinerConfig;
//! use bibminer::dblp::{ConferenceQuery, DblpMiner};
//! use bibminer::fetch::{ContentFetcher, HttpTransport};
//! use bibminer::harvest::{Harvester, RecordSink};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MinerConfig::default();
//!     let fetcher = ContentFetcher::new(
//!         Arc::new(HttpTransport::new(&config.http)?),
//!         Arc::new(FsCache::new(&config.cache.dir)),
//!     );
//!     let harvester = Harvester::new(
//!         DblpMiner::new(fetcher.clone(), config.dblp),
//!         Some(CiteSeerMiner::new(fetcher, config.citeseer)),
//!     );
//!     let mut sink = RecordSink::new(std::io::stdout());
//!     let summary = harvester.run(&ConferenceQuery::new("icse"), &mut sink).await?;
//!     eprintln!("Wrote {} records", summary.records);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod citeseer;
pub mod config;
pub mod dblp;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod markup;
pub mod matching;
pub mod miner;
pub mod record;
pub mod xml_tree;

#[cfg(test)]
mod testing;

pub use error::{MinerError, Result};
pub use miner::BibliographyMiner;
