use crate::accumulator::{AccumulatorLimits, CandidateAccumulator};
use crate::browser::WebDriverPageSource;
use crate::content::generate_fallback_content;
use crate::fetcher::Fetcher;
use crate::filter::DocumentFilter;
use crate::sources::validate_documents;
use crate::traits::Collector;
use crate::types::{BrowserConfig, Document, Result, SourceConfig};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_CONTENT_CHARS: usize = 8000;

/// Page text lookup for kept documents, with generated text as fallback.
pub struct ContentEnrichment {
    pub fetcher: Arc<Fetcher>,
    pub min_chars: usize,
    pub label: String,
}

impl ContentEnrichment {
    async fn fill(&self, documents: &mut [Document]) {
        for doc in documents.iter_mut() {
            let fetched = if doc.file_kind.as_deref() == Some("pdf") {
                debug!("Skipping content fetch for PDF {}", doc.url);
                None
            } else {
                match self.fetcher.fetch_full_content(&doc.url).await {
                    Ok(text) if text.trim().chars().count() >= self.min_chars => {
                        Some(truncate_chars(&text, MAX_CONTENT_CHARS))
                    }
                    Ok(_) => {
                        warn!("Insufficient content for {} ({}), generating fallback", doc.name, doc.url);
                        None
                    }
                    Err(e) => {
                        warn!("Failed to fetch content for {}: {}", doc.url, e);
                        None
                    }
                }
            };

            doc.content = Some(fetched.unwrap_or_else(|| generate_fallback_content(&doc.name, &doc.url, &self.label)));
        }
    }
}

/// Collects documents from a vendor search page rendered through WebDriver.
pub struct VendorDocsCollector {
    id: String,
    name: String,
    search_url: String,
    browser: BrowserConfig,
    filter: DocumentFilter,
    limits: AccumulatorLimits,
    rate_limit_seconds: u64,
    enrichment: Option<ContentEnrichment>,
}

impl VendorDocsCollector {
    pub fn new(
        source: &SourceConfig,
        display_name: impl Into<String>,
        search_url: impl Into<String>,
        browser: BrowserConfig,
        filter: DocumentFilter,
    ) -> Self {
        Self {
            id: source.name.clone(),
            name: display_name.into(),
            search_url: search_url.into(),
            browser,
            filter,
            limits: AccumulatorLimits {
                max_results: source.max_results,
                max_pages: source.max_pages,
                max_consecutive_empty_pages: source.max_consecutive_empty_pages,
            },
            rate_limit_seconds: source.rate_limit_seconds,
            enrichment: None,
        }
    }

    pub fn with_enrichment(mut self, enrichment: ContentEnrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl Collector for VendorDocsCollector {
    fn source_id(&self) -> String {
        self.id.clone()
    }

    fn source_name(&self) -> String {
        self.name.clone()
    }

    async fn collect(&mut self) -> Result<Vec<Document>> {
        info!("Collecting {} from {}", self.name, self.search_url);

        let mut pages = WebDriverPageSource::open(&self.browser, &self.search_url).await?;
        let mut accumulator = CandidateAccumulator::new(&self.filter, self.id.as_str(), self.limits);
        let outcome = accumulator.accumulate(&mut pages).await;
        pages.close().await;

        let mut documents = outcome?;
        if let Some(enrichment) = &self.enrichment {
            enrichment.fill(&mut documents).await;
        }

        Ok(validate_documents(&self.id, documents))
    }

    fn rate_limit_seconds(&self) -> u64 {
        self.rate_limit_seconds
    }
}
