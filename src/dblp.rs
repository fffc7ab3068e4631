//! DBLP conference mining.
//!
//! Three stages, each a pure function of fetched content:
//!
//! 1. conference index page -> year page addresses (blocks flagged with the
//!    year icon, filtered to links under the same venue keyword)
//! 2. year page -> paper XML addresses (links whose text contains "XML")
//! 3. paper XML -> [`PaperRecord`] (two envelope levels unwrapped, text
//!    titles only)
//!
//! Years are produced lazily as a stream so records can be written while
//! later years are still being fetched. A failed fetch or decode anywhere in
//! a year abandons that whole year.

use crate::config::DblpConfig;
use crate::error::{MinerError, Result};
use crate::fetch::ContentFetcher;
use crate::markup::{self, Markup};
use crate::miner::BibliographyMiner;
use crate::record::{self, PaperRecord};
use crate::xml_tree;
use futures::stream::{self, LocalBoxStream, StreamExt};
use scraper::ElementRef;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Which part of a conference's history to mine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferenceQuery {
    /// Venue identifier as used in DBLP paths (e.g. "icse")
    pub conference: String,
    /// Maximum number of year pages to visit
    pub limit: usize,
    /// Year pages to skip, in index-page order
    pub skip: usize,
}

impl ConferenceQuery {
    pub fn new(conference: impl Into<String>) -> Self {
        Self {
            conference: conference.into(),
            limit: 30,
            skip: 0,
        }
    }

    pub fn window(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }
}

/// Records of one year page, or the error that abandoned it
#[derive(Debug)]
pub struct YearBatch {
    pub year_url: String,
    pub records: Result<Vec<PaperRecord>>,
}

/// Lazily mined year batches, in index-page order
pub type YearBatches = LocalBoxStream<'static, YearBatch>;

/// Miner for DBLP conference pages
#[derive(Clone)]
pub struct DblpMiner {
    fetcher: ContentFetcher,
    config: Arc<DblpConfig>,
}

impl DblpMiner {
    pub fn new(fetcher: ContentFetcher, config: DblpConfig) -> Self {
        Self {
            fetcher,
            config: Arc::new(config),
        }
    }

    /// Year page addresses listed on a conference index page
    pub async fn year_urls(&self, index_url: &str) -> Result<Vec<String>> {
        let page = self.fetcher.fetch(index_url).await?;
        extract_year_urls(&page, index_url, &self.config)
    }

    /// Paper XML addresses listed on a year page
    pub async fn paper_xml_urls(&self, year_url: &str) -> Result<Vec<String>> {
        let page = self.fetcher.fetch(year_url).await?;
        extract_paper_xml_urls(&page, year_url, &self.config)
    }

    /// Metadata object of one paper, envelope removed
    pub async fn paper_metadata(&self, xml_url: &str) -> Result<Map<String, Value>> {
        let xml = self.fetcher.fetch(xml_url).await?;
        unwrap_envelope(xml_tree::parse(&xml)?)
    }

    /// All records of one year page; any failure abandons the whole year
    pub async fn year_records(&self, year_url: &str) -> Result<Vec<PaperRecord>> {
        let xml_urls = self.paper_xml_urls(year_url).await?;
        debug!(year = year_url, papers = xml_urls.len(), "Found paper links");

        let mut objects = Vec::with_capacity(xml_urls.len());
        for xml_url in &xml_urls {
            objects.push(self.paper_metadata(xml_url).await?);
        }

        Ok(record::text_titled(objects)
            .into_iter()
            .filter_map(PaperRecord::from_metadata)
            .collect())
    }
}

impl BibliographyMiner for DblpMiner {
    type Query = ConferenceQuery;
    type Output = YearBatches;

    /// Reads the year index eagerly (its failure ends the run) and returns
    /// the windowed years as a stream.
    async fn mine(&self, query: &ConferenceQuery) -> Result<YearBatches> {
        let index_url = self.config.index_url(&query.conference);
        let year_urls = self.year_urls(&index_url).await?;
        let total = year_urls.len();

        let window: Vec<String> = year_urls
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect();

        info!(
            conference = %query.conference,
            years = total,
            skip = query.skip,
            limit = query.limit,
            selected = window.len(),
            "Read conference index"
        );

        let miner = self.clone();
        let batches = stream::iter(window).then(move |year_url| {
            let miner = miner.clone();
            async move {
                let records = miner.year_records(&year_url).await;
                YearBatch { year_url, records }
            }
        });

        Ok(batches.boxed_local())
    }
}

/// Venue keyword of an index address: the path segment holding `index.html`
fn venue_keyword(index_url: &str) -> Option<&str> {
    index_url.rsplit('/').nth(1).filter(|k| !k.is_empty())
}

/// Resolve `href` against the page it was found on
fn resolve(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// A block is a year entry when it carries the year flag icon
fn is_year_block(block: ElementRef<'_>, icon: &str) -> Result<bool> {
    Ok(markup::all_within(block, "img")?
        .into_iter()
        .any(|img| img.value().attr("src") == Some(icon)))
}

fn is_paper_xml_link(link: ElementRef<'_>, marker: &str) -> bool {
    markup::text_of(link).contains(marker)
}

/// Stage 1: year page addresses from a conference index page
pub fn extract_year_urls(html: &str, index_url: &str, config: &DblpConfig) -> Result<Vec<String>> {
    let keyword = venue_keyword(index_url).ok_or_else(|| {
        MinerError::Structure(format!("No venue keyword in address {}", index_url))
    })?;

    let markup = Markup::parse(html);
    let mut urls = Vec::new();
    for block in markup.select_all(&config.year_block_selector)? {
        if !is_year_block(block, &config.year_flag_icon)? {
            continue;
        }
        let Some(href) = markup::first_within(block, "a")?.and_then(markup::href) else {
            continue;
        };
        if href.contains(keyword) {
            urls.push(resolve(index_url, href));
        }
    }
    Ok(urls)
}

/// Stage 2: paper XML addresses from a year page
pub fn extract_paper_xml_urls(html: &str, year_url: &str, config: &DblpConfig) -> Result<Vec<String>> {
    let markup = Markup::parse(html);
    Ok(markup
        .select_all("a")?
        .into_iter()
        .filter(|link| is_paper_xml_link(*link, &config.paper_link_marker))
        .filter_map(markup::href)
        .map(|href| resolve(year_url, href))
        .collect())
}

fn first_value(value: Value) -> Option<Value> {
    match value {
        Value::Object(fields) => fields.into_iter().next().map(|(_, v)| v),
        _ => None,
    }
}

/// Stage 3: the record object inside `{"dblp": {"<kind>": {...}}}`
pub fn unwrap_envelope(tree: Value) -> Result<Map<String, Value>> {
    let outer = first_value(tree)
        .ok_or_else(|| MinerError::Parse("document has no envelope".to_string()))?;
    match first_value(outer) {
        Some(Value::Object(fields)) => Ok(fields),
        _ => Err(MinerError::Parse(
            "envelope does not wrap a single record".to_string(),
        )),
    }
}
