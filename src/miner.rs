//! The capability shared by every bibliography source.

use crate::error::Result;

/// A source that can be mined for one kind of query.
///
/// [`crate::dblp::DblpMiner`] mines a conference into a stream of per-year
/// record batches; [`crate::citeseer::CiteSeerMiner`] mines a paper title
/// into the authors of papers citing it. The orchestrator only sees this
/// trait, so new sources plug in without touching it.
#[allow(async_fn_in_trait)]
pub trait BibliographyMiner {
    /// What identifies the thing to mine
    type Query: ?Sized;
    /// What mining produces
    type Output;

    async fn mine(&self, query: &Self::Query) -> Result<Self::Output>;
}
