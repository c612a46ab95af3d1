use crate::types::{Candidate, Document, Result};
use async_trait::async_trait;

/// A named collection step that produces documents for one source.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Key under which results are reported, e.g. "xilinx".
    fn source_id(&self) -> String;

    /// Human-readable name for logs.
    fn source_name(&self) -> String;

    /// Run one collection. Returned documents are validated and carry
    /// unique URLs.
    async fn collect(&mut self) -> Result<Vec<Document>>;

    /// Delay to observe after this collector finishes.
    fn rate_limit_seconds(&self) -> u64;
}

/// A paged or infinitely scrolling result listing.
#[async_trait]
pub trait PageSource: Send {
    /// Search URL the listing was opened with; relative links resolve against it.
    fn search_url(&self) -> &str;

    /// Raw link candidates currently visible.
    async fn fetch_page(&mut self) -> Result<Vec<Candidate>>;

    /// Move to the next page or load more results. `false` when nothing changed.
    async fn advance(&mut self) -> Result<bool>;
}
