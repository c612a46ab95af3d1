use crate::fetcher::Fetcher;
use crate::filter::{DocumentFilter, VendorProfile};
use crate::sources::{quote, ContentEnrichment, VendorDocsCollector};
use crate::traits::Collector;
use crate::types::{AlteraSearch, BrowserConfig, Document, Result, SourceConfig};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Intel (Altera) site search. Kept documents get their page text, or
/// generated text when the page cannot be read.
pub struct AlteraCollector {
    inner: VendorDocsCollector,
}

impl AlteraCollector {
    pub fn new(
        source: &SourceConfig,
        search: &AlteraSearch,
        browser: BrowserConfig,
        fetcher: Arc<Fetcher>,
    ) -> Result<Self> {
        let filter = DocumentFilter::new(VendorProfile::altera(), &source.excluded_patterns)?;
        let search_url = build_search_url(search);
        info!("Built Altera search URL: {}", search_url);

        let inner = VendorDocsCollector::new(source, "Intel (Altera) Documentation", search_url, browser, filter)
            .with_enrichment(ContentEnrichment {
                fetcher,
                min_chars: search.min_content_chars,
                label: "Intel/Altera Documentation".to_string(),
            });
        Ok(Self { inner })
    }
}

pub fn build_search_url(search: &AlteraSearch) -> String {
    format!("{}?q={}&s={}", search.base_url, quote(&search.query), quote(&search.sort))
}

#[async_trait]
impl Collector for AlteraCollector {
    fn source_id(&self) -> String {
        self.inner.source_id()
    }

    fn source_name(&self) -> String {
        format!("Altera: {}", self.inner.search_url())
    }

    async fn collect(&mut self) -> Result<Vec<Document>> {
        self.inner.collect().await
    }

    fn rate_limit_seconds(&self) -> u64 {
        self.inner.rate_limit_seconds()
    }
}
