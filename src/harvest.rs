//! Run orchestration: conference years in, JSON Lines out.
//!
//! The harvester drives a conference miner over its year window and, when a
//! citation miner is configured, attaches citing authors to every record
//! before writing it. Each record is flushed as soon as it is written.

use crate::citeseer::CitationOutcome;
use crate::dblp::{ConferenceQuery, YearBatches};
use crate::error::Result;
use crate::miner::BibliographyMiner;
use crate::record::PaperRecord;
use futures::StreamExt;
use std::io::Write;
use tracing::{info, warn};

/// JSON Lines writer, one flushed line per record
pub struct RecordSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> RecordSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn write(&mut self, record: &PaperRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Counters for one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Year pages visited
    pub years: usize,
    /// Year pages abandoned after a failure
    pub abandoned_years: usize,
    /// Records written
    pub records: usize,
    /// Records written with a `citations` field
    pub with_citations: usize,
}

/// Drives a conference miner and an optional citation miner
pub struct Harvester<C, R> {
    conferences: C,
    citations: Option<R>,
}

impl<C, R> Harvester<C, R>
where
    C: BibliographyMiner<Query = ConferenceQuery, Output = YearBatches>,
    R: BibliographyMiner<Query = str, Output = CitationOutcome>,
{
    /// `citations: None` disables citation mining entirely.
    pub fn new(conferences: C, citations: Option<R>) -> Self {
        Self {
            conferences,
            citations,
        }
    }

    /// Mine `query` and stream every record into `sink`.
    ///
    /// Only a failure to read the conference index is returned as an error;
    /// failed years are logged, counted and skipped.
    pub async fn run<W: Write>(
        &self,
        query: &ConferenceQuery,
        sink: &mut RecordSink<W>,
    ) -> Result<HarvestSummary> {
        let mut summary = HarvestSummary::default();
        let mut batches = self.conferences.mine(query).await?;

        while let Some(batch) = batches.next().await {
            summary.years += 1;
            let records = match batch.records {
                Ok(records) => records,
                Err(e) => {
                    warn!(year = %batch.year_url, error = %e, "Abandoning year batch");
                    summary.abandoned_years += 1;
                    continue;
                }
            };
            info!(year = %batch.year_url, count = records.len(), "Mined year");

            for mut record in records {
                if let Some(citations) = &self.citations {
                    self.attach_citations(citations, &mut record).await;
                }
                if record.citations.is_some() {
                    summary.with_citations += 1;
                }
                sink.write(&record)?;
                summary.records += 1;
            }
        }

        info!(
            years = summary.years,
            abandoned = summary.abandoned_years,
            records = summary.records,
            with_citations = summary.with_citations,
            "Harvest complete"
        );
        Ok(summary)
    }

    async fn attach_citations(&self, citations: &R, record: &mut PaperRecord) {
        let outcome = citations.mine(record.title.as_str()).await;
        match outcome {
            Ok(outcome) => {
                if let Some(names) = outcome.into_authors() {
                    record.attach_citations(names);
                }
            }
            Err(e) => warn!(title = %record.title, error = %e, "Citation mining failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, PageCache};
    use crate::citeseer::CiteSeerMiner;
    use crate::config::{CiteSeerConfig, DblpConfig};
    use crate::dblp::DblpMiner;
    use crate::fetch::{ContentFetcher, Transport};
    use crate::testing::FixtureTransport;
    use std::sync::Arc;

    const ICON: &str = "http://dblp.uni-trier.de/img/venues.dark.hollow.16x16.png";
    const INDEX: &str = "http://dblp.test/db/conf/podc/index.html";

    fn dblp_config() -> DblpConfig {
        DblpConfig {
            index_url_format: "http://dblp.test/db/conf/{name}/index.html".to_string(),
            ..Default::default()
        }
    }

    fn citeseer_config() -> CiteSeerConfig {
        CiteSeerConfig {
            domain: "http://citeseer.test".to_string(),
            ..Default::default()
        }
    }

    fn paper_xml(key: &str, title: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><dblp><inproceedings key="{key}"><author>Ann Smith</author><title>{title}</title><year>2001</year></inproceedings></dblp>"#
        )
    }

    /// Two years: 2001 with two papers (one cited on CiteSeer), 2002 broken
    fn site() -> FixtureTransport {
        let index = format!(
            r#"<html><body>
            <div class="head"><img src="{icon}"/><a href="http://dblp.test/db/conf/podc/podc2001.html">PODC 2001</a></div>
            <div class="head"><img src="{icon}"/><a href="http://dblp.test/db/conf/podc/podc2002.html">PODC 2002</a></div>
            </body></html>"#,
            icon = ICON
        );
        let year_2001 = r#"<html><body>
            <a href="http://dblp.test/rec/xml/p1.xml">XML</a>
            <a href="http://dblp.test/rec/xml/p2.xml">XML</a>
            </body></html>"#;
        let year_2002 = r#"<html><body><a href="http://dblp.test/rec/xml/gone.xml">XML</a></body></html>"#;

        let config = citeseer_config();
        FixtureTransport::new()
            .page(INDEX, &index)
            .page("http://dblp.test/db/conf/podc/podc2001.html", year_2001)
            .page("http://dblp.test/db/conf/podc/podc2002.html", year_2002)
            .page("http://dblp.test/rec/xml/p1.xml", &paper_xml("p1", "Wait-Free Synchronization."))
            .page("http://dblp.test/rec/xml/p2.xml", &paper_xml("p2", "Uncited Musings."))
            .page(
                &config.search_url("wait-free synchronization."),
                r#"<div class="result"><h3><a href="/viewdoc/summary?doi=1">Wait-Free Synchronization</a></h3></div>"#,
            )
            .page(
                "http://citeseer.test/viewdoc/summary?doi=1",
                r#"<div id="citations"><a href="/viewdoc/summary?doi=c1">c1</a></div>"#,
            )
            .page(
                "http://citeseer.test/viewdoc/summary?doi=c1",
                r#"<div id="docAuthors">by Nancy Lynch, Leslie Lamport</div>"#,
            )
            .page(
                &config.search_url("uncited musings."),
                "<html><body>No documents match</body></html>",
            )
    }

    fn harvester(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn PageCache>,
        cite: bool,
    ) -> Harvester<DblpMiner, CiteSeerMiner> {
        let fetcher = ContentFetcher::new(transport, cache);
        let citations = cite.then(|| CiteSeerMiner::new(fetcher.clone(), citeseer_config()));
        Harvester::new(DblpMiner::new(fetcher, dblp_config()), citations)
    }

    async fn run_to_string(
        harvester: &Harvester<DblpMiner, CiteSeerMiner>,
        query: &ConferenceQuery,
    ) -> Result<(String, HarvestSummary)> {
        let mut sink = RecordSink::new(Vec::new());
        let summary = harvester.run(query, &mut sink).await?;
        assert_eq!(sink.written(), summary.records);
        let output = String::from_utf8(sink.into_inner()).expect("utf-8 output");
        Ok((output, summary))
    }

    fn lines(output: &str) -> Vec<PaperRecord> {
        output
            .lines()
            .map(|line| serde_json::from_str(line).expect("record line"))
            .collect()
    }

    #[tokio::test]
    async fn test_run_with_citations() -> Result<()> {
        let transport = Arc::new(site());
        let harvester = harvester(transport, Arc::new(MemoryCache::new()), true);
        let (output, summary) = run_to_string(&harvester, &ConferenceQuery::new("podc")).await?;

        assert_eq!(
            summary,
            HarvestSummary {
                years: 2,
                abandoned_years: 1,
                records: 2,
                with_citations: 1,
            }
        );

        let records = lines(&output);
        assert_eq!(records[0].title, "Wait-Free Synchronization.");
        assert_eq!(
            records[0].citations,
            Some(vec!["Nancy Lynch".to_string(), "Leslie Lamport".to_string()])
        );
        assert_eq!(records[1].title, "Uncited Musings.");
        assert!(records[1].citations.is_none());
        assert!(!output.lines().nth(1).expect("second line").contains("citations"));
        Ok(())
    }

    #[tokio::test]
    async fn test_nocite_never_touches_citeseer() -> Result<()> {
        let transport = Arc::new(site());
        let harvester = harvester(transport.clone(), Arc::new(MemoryCache::new()), false);
        let (output, summary) = run_to_string(&harvester, &ConferenceQuery::new("podc")).await?;

        assert_eq!(summary.records, 2);
        assert_eq!(summary.with_citations, 0);
        assert!(!output.contains("citations"));
        assert!(transport
            .calls()
            .iter()
            .all(|address| !address.contains("citeseer")));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_window_writes_nothing() -> Result<()> {
        let transport = Arc::new(site());
        let harvester = harvester(transport, Arc::new(MemoryCache::new()), true);
        let query = ConferenceQuery::new("podc").window(0, 0);
        let (output, summary) = run_to_string(&harvester, &query).await?;

        assert!(output.is_empty());
        assert_eq!(summary, HarvestSummary::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_warm_cache_rerun_is_identical_and_offline() -> Result<()> {
        let cache: Arc<dyn PageCache> = Arc::new(MemoryCache::new());
        let query = ConferenceQuery::new("podc").window(0, 1);

        let online = harvester(Arc::new(site()), cache.clone(), true);
        let (first, _) = run_to_string(&online, &query).await?;

        let offline_transport = Arc::new(FixtureTransport::new());
        let offline = harvester(offline_transport.clone(), cache, true);
        let (second, summary) = run_to_string(&offline, &query).await?;

        assert_eq!(summary.records, 2);
        assert_eq!(first, second);
        assert_eq!(offline_transport.call_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_index_is_an_error() {
        let harvester = harvester(
            Arc::new(FixtureTransport::new()),
            Arc::new(MemoryCache::new()),
            true,
        );
        let mut sink = RecordSink::new(Vec::new());
        let result = harvester.run(&ConferenceQuery::new("podc"), &mut sink).await;
        assert!(result.is_err());
        assert_eq!(sink.written(), 0);
    }
}
