//! CiteSeer citing-author resolution.
//!
//! Given a paper title: search CiteSeer, accept the first hit only when it
//! passes the half-prefix match, then collect the authors of the first few
//! papers listed as citing it.

use crate::config::CiteSeerConfig;
use crate::error::{OptionExt, Result};
use crate::fetch::ContentFetcher;
use crate::markup::{self, Markup};
use crate::matching::{comparable_title, half_prefix_match, plain_ascii};
use crate::miner::BibliographyMiner;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Author names parsed from one citing document
pub type AuthorGroup = Vec<String>;

/// Result of resolving one title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationOutcome {
    /// A candidate matched; names of citing authors, possibly empty
    Found(Vec<String>),
    /// No search result passed the title match
    NotFound,
    /// Fetching or reading a CiteSeer page failed
    Failed(String),
}

impl CitationOutcome {
    /// Citing authors, if the title was found
    pub fn into_authors(self) -> Option<Vec<String>> {
        match self {
            CitationOutcome::Found(names) => Some(names),
            CitationOutcome::NotFound | CitationOutcome::Failed(_) => None,
        }
    }
}

/// First search hit: its title and document address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationCandidate {
    pub title: String,
    pub address: String,
}

/// Miner for CiteSeer citing authors
#[derive(Clone)]
pub struct CiteSeerMiner {
    fetcher: ContentFetcher,
    config: Arc<CiteSeerConfig>,
}

impl CiteSeerMiner {
    pub fn new(fetcher: ContentFetcher, config: CiteSeerConfig) -> Self {
        Self {
            fetcher,
            config: Arc::new(config),
        }
    }

    async fn resolve(&self, query: &str) -> Result<CitationOutcome> {
        let search_url = self.config.search_url(query);
        let page = self.fetcher.fetch(&search_url).await?;

        let Some(candidate) = extract_candidate(&page, &self.config)? else {
            return Ok(CitationOutcome::NotFound);
        };
        if !half_prefix_match(query, &comparable_title(&candidate.title)) {
            debug!(query, candidate = %candidate.title, "Search hit rejected");
            return Ok(CitationOutcome::NotFound);
        }

        let document = self.fetcher.fetch(&candidate.address).await?;
        let citing_urls = extract_citing_urls(&document, &self.config)?;

        let mut names = Vec::new();
        for url in citing_urls.iter().take(self.config.max_citing_documents) {
            let page = self.fetcher.fetch(url).await?;
            names.extend(extract_authors(&page, &self.config));
        }
        Ok(CitationOutcome::Found(names))
    }
}

impl BibliographyMiner for CiteSeerMiner {
    type Query = str;
    type Output = CitationOutcome;

    /// Never returns `Err`: failures become [`CitationOutcome::Failed`].
    async fn mine(&self, title: &str) -> Result<CitationOutcome> {
        let query = comparable_title(title);
        if query.is_empty() {
            return Ok(CitationOutcome::NotFound);
        }

        let outcome = match self.resolve(&query).await {
            Ok(outcome) => outcome,
            Err(e) => CitationOutcome::Failed(e.to_string()),
        };

        match &outcome {
            CitationOutcome::Found(names) => {
                info!(title = %query, citing_authors = names.len(), "citation found")
            }
            CitationOutcome::NotFound => info!(title = %query, "citation not found"),
            CitationOutcome::Failed(reason) => {
                warn!(title = %query, error = %reason, "citation lookup failed")
            }
        }
        Ok(outcome)
    }
}

/// First result block's linked title and absolute document address
pub fn extract_candidate(html: &str, config: &CiteSeerConfig) -> Result<Option<CitationCandidate>> {
    let markup = Markup::parse(html);
    let Some(result) = markup.first("div.result")? else {
        return Ok(None);
    };
    let Some(heading) = markup::first_within(result, "h3")? else {
        return Ok(None);
    };
    let Some(link) = markup::first_within(heading, "a")? else {
        return Ok(None);
    };
    Ok(markup::href(link).map(|href| CitationCandidate {
        title: markup::text_of(link).trim().to_string(),
        address: config.absolute(href),
    }))
}

/// Addresses of citing documents listed on a document page
pub fn extract_citing_urls(html: &str, config: &CiteSeerConfig) -> Result<Vec<String>> {
    let markup = Markup::parse(html);
    let citations = markup
        .first("div#citations")?
        .ok_or_structure("document page has no citations block")?;

    Ok(markup::all_within(citations, "a")?
        .into_iter()
        .filter_map(markup::href)
        .map(|href| config.absolute(href))
        .filter(|url| url.contains(&config.document_link_marker))
        .collect())
}

/// Author names of a citing document; empty when the author line is missing.
pub fn extract_authors(html: &str, config: &CiteSeerConfig) -> AuthorGroup {
    match author_line(html) {
        Ok(line) => split_authors(&line, &config.author_label),
        Err(e) => {
            debug!(error = %e, "No author list in citing document");
            Vec::new()
        }
    }
}

fn author_line(html: &str) -> Result<String> {
    let markup = Markup::parse(html);
    let authors = markup
        .first("div#docAuthors")?
        .ok_or_structure("citing document has no author block")?;
    markup::leading_text(authors).ok_or_structure("author block has no text")
}

/// Collapse whitespace, drop the leading label and split on commas
fn split_authors(line: &str, label: &str) -> AuthorGroup {
    let plain = plain_ascii(line);
    let collapsed = WHITESPACE_RE.replace_all(plain.trim(), " ");
    let names = collapsed.strip_prefix(label).unwrap_or(&collapsed);

    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
