use crate::fetcher::Fetcher;
use crate::parser::{ArxivEntry, FeedParser};
use crate::snapshot::SnapshotStore;
use crate::sources::validate_documents;
use crate::traits::Collector;
use crate::types::{ArxivSearch, Document, GathererError, Result, SourceConfig, SourceKind};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Papers from the arXiv Atom API, reduced to the ones absent from the
/// previous run's snapshot.
pub struct ArxivCollector {
    id: String,
    search: ArxivSearch,
    max_results: usize,
    rate_limit_seconds: u64,
    fetcher: Arc<Fetcher>,
    snapshot: SnapshotStore,
}

impl ArxivCollector {
    pub fn new(source: &SourceConfig, search: &ArxivSearch, fetcher: Arc<Fetcher>, snapshot: SnapshotStore) -> Self {
        Self {
            id: source.name.clone(),
            search: search.clone(),
            max_results: source.max_results,
            rate_limit_seconds: source.rate_limit_seconds,
            fetcher,
            snapshot,
        }
    }

    /// Every paper currently listed for the configured categories.
    /// Fails only when no category could be fetched.
    pub async fn fetch_current(&self) -> Result<Vec<Document>> {
        let mut parser = FeedParser::new();
        let mut documents = Vec::new();
        let mut failures = 0;

        for (index, category) in self.search.categories.iter().enumerate() {
            if index > 0 && self.rate_limit_seconds > 0 {
                tokio::time::sleep(Duration::from_secs(self.rate_limit_seconds)).await;
            }

            match self.fetch_category(&mut parser, category).await {
                Ok(papers) => {
                    info!("arXiv {}: {} papers", category, papers.len());
                    documents.extend(papers);
                }
                Err(e) => {
                    error!("arXiv {}: fetch failed: {}", category, e);
                    failures += 1;
                }
            }
        }

        if failures > 0 && failures == self.search.categories.len() {
            return Err(GathererError::General(format!(
                "all {} arXiv categories failed",
                failures
            )));
        }
        Ok(documents)
    }

    async fn fetch_category(&self, parser: &mut FeedParser, category: &str) -> Result<Vec<Document>> {
        let query = [
            ("search_query", format!("cat:{}", category)),
            ("start", "0".to_string()),
            ("max_results", self.max_results.to_string()),
            ("sortBy", self.search.sort_by.clone()),
            ("sortOrder", self.search.sort_order.clone()),
        ];
        let page = self.fetcher.fetch(&self.search.base_url, &query).await?;

        if !FeedParser::is_valid_feed_content(&page.body) {
            warn!("arXiv {}: response does not look like a feed", category);
        }
        let entries = parser.parse_arxiv_feed(&page.body)?;

        let search_url = format!("{}?search_query=cat:{}", self.search.base_url, category);
        Ok(entries
            .into_iter()
            .map(|entry| to_document(entry, &self.id, category, &search_url))
            .collect())
    }
}

fn to_document(entry: ArxivEntry, source: &str, category: &str, search_url: &str) -> Document {
    let metadata = json!({
        "authors": entry.authors,
        "categories": entry.categories,
        "published": entry.published_at.map(|t| t.to_rfc3339()),
        "updated": entry.updated_at.map(|t| t.to_rfc3339()),
    });

    Document::builder(entry.title, entry.url, source, SourceKind::RestApi)
        .search_url(search_url)
        .category(category)
        .abstract_text(entry.summary.clone())
        .content(Some(entry.summary))
        .metadata(metadata)
        .build()
}

#[async_trait]
impl Collector for ArxivCollector {
    fn source_id(&self) -> String {
        self.id.clone()
    }

    fn source_name(&self) -> String {
        format!("arXiv: {}", self.search.categories.join(", "))
    }

    async fn collect(&mut self) -> Result<Vec<Document>> {
        let current = validate_documents(&self.id, self.fetch_current().await?);
        if !self.search.enable_diff {
            info!("arXiv: diff disabled, returning all {} papers", current.len());
            return Ok(current);
        }
        let new = self.snapshot.diff_and_store(&current)?;
        info!("arXiv: {} new papers out of {}", new.len(), current.len());
        Ok(new)
    }

    fn rate_limit_seconds(&self) -> u64 {
        self.rate_limit_seconds
    }
}
