use crate::filter::{DocumentFilter, VendorProfile};
use crate::sources::{quote, VendorDocsCollector};
use crate::traits::Collector;
use crate::types::{BrowserConfig, Document, Result, SourceConfig, XilinxSearch};
use async_trait::async_trait;
use tracing::info;

/// AMD (Xilinx) documentation portal search.
pub struct XilinxCollector {
    inner: VendorDocsCollector,
}

impl XilinxCollector {
    pub fn new(source: &SourceConfig, search: &XilinxSearch, browser: BrowserConfig) -> Result<Self> {
        let filter = DocumentFilter::new(VendorProfile::xilinx(), &source.excluded_patterns)?;
        let search_url = build_search_url(search);
        info!("Built Xilinx search URL: {}", search_url);

        let inner = VendorDocsCollector::new(source, "AMD (Xilinx) Documentation", search_url, browser, filter);
        Ok(Self { inner })
    }
}

/// Search URL in the portal's own filter syntax; quoted filter values are
/// percent-encoded and joined with `_`.
pub fn build_search_url(search: &XilinxSearch) -> String {
    let join = |values: &[String]| {
        values
            .iter()
            .map(|v| quote(&format!("\"{}\"", v)))
            .collect::<Vec<_>>()
            .join("_")
    };

    format!(
        "{}?query={}&value-filters=Document_Type_custom~{}*Product_custom~{}&date-filters=ft%253AlastEdition~{}&content-lang={}",
        search.base_url,
        quote(&search.query),
        join(&search.document_types),
        join(&search.product_types),
        search.date_filter,
        search.content_lang
    )
}

#[async_trait]
impl Collector for XilinxCollector {
    fn source_id(&self) -> String {
        self.inner.source_id()
    }

    fn source_name(&self) -> String {
        format!("Xilinx: {}", self.inner.search_url())
    }

    async fn collect(&mut self) -> Result<Vec<Document>> {
        self.inner.collect().await
    }

    fn rate_limit_seconds(&self) -> u64 {
        self.inner.rate_limit_seconds()
    }
}
