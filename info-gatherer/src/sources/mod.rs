pub mod altera;
pub mod arxiv;
pub mod vendor_docs;
pub mod xilinx;

pub use altera::AlteraCollector;
pub use arxiv::ArxivCollector;
pub use vendor_docs::{ContentEnrichment, VendorDocsCollector};
pub use xilinx::XilinxCollector;

use crate::fetcher::Fetcher;
use crate::snapshot::SnapshotStore;
use crate::traits::Collector;
use crate::types::{CollectorConfig, Document, GathererConfig, Result, SourceConfig};
use std::sync::Arc;
use tracing::warn;

/// Construct the collector described by `source`.
pub fn build_collector(
    source: &SourceConfig,
    config: &GathererConfig,
    fetcher: Arc<Fetcher>,
) -> Result<Box<dyn Collector>> {
    let collector: Box<dyn Collector> = match &source.collector {
        CollectorConfig::Xilinx(search) => Box::new(XilinxCollector::new(source, search, config.browser.clone())?),
        CollectorConfig::Altera(search) => {
            Box::new(AlteraCollector::new(source, search, config.browser.clone(), fetcher)?)
        }
        CollectorConfig::Arxiv(search) => {
            let snapshot = SnapshotStore::new(config.snapshot_path(), config.diff_path());
            Box::new(ArxivCollector::new(source, search, fetcher, snapshot))
        }
    };
    Ok(collector)
}

/// Drop documents that fail validation, logging each one.
pub fn validate_documents(source: &str, documents: Vec<Document>) -> Vec<Document> {
    documents
        .into_iter()
        .filter(|doc| match doc.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: dropping invalid document: {}", source, e);
                false
            }
        })
        .collect()
}

/// Percent-encode everything except ASCII alphanumerics and `_.-~/`.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-' | b'~' | b'/') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
