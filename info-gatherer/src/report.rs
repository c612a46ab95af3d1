use crate::types::{Document, Result};
use crate::utils::write_json_atomic;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Collected documents keyed by source, in request order.
pub type SourceResults = IndexMap<String, Vec<Document>>;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub total_sources: usize,
    pub total_documents: usize,
    pub sources: IndexMap<String, SourceReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub search_url: Option<String>,
    pub document_count: usize,
    /// Stored without the per-document `search_url`, which lives one level up.
    #[serde(serialize_with = "serialize_records")]
    pub documents: Vec<Document>,
}

impl Report {
    pub fn from_results(results: &SourceResults) -> Self {
        let sources = results
            .iter()
            .map(|(name, documents)| {
                let search_url = documents.iter().find_map(|d| d.search_url.clone());
                let report = SourceReport {
                    search_url,
                    document_count: documents.len(),
                    documents: documents.clone(),
                };
                (name.clone(), report)
            })
            .collect::<IndexMap<_, _>>();

        Self {
            generated_at: Utc::now(),
            run_id: Uuid::new_v4(),
            total_sources: sources.len(),
            total_documents: sources.values().map(|s| s.document_count).sum(),
            sources,
        }
    }

    /// Rebuild the per-source document lists, restoring each source's search URL.
    pub fn into_results(self) -> SourceResults {
        self.sources
            .into_iter()
            .map(|(name, source)| {
                let search_url = source.search_url;
                let documents = source
                    .documents
                    .into_iter()
                    .map(|mut doc| {
                        if doc.search_url.is_none() {
                            doc.search_url = search_url.clone();
                        }
                        doc.normalized()
                    })
                    .collect();
                (name, documents)
            })
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn serialize_records<S: Serializer>(documents: &[Document], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(documents.len()))?;
    for doc in documents {
        seq.serialize_element(&DocumentRecord(doc))?;
    }
    seq.end()
}

struct DocumentRecord<'a>(&'a Document);

impl Serialize for DocumentRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let doc = self.0;
        let mut map = serializer.serialize_map(Some(12))?;
        map.serialize_entry("name", &doc.name)?;
        map.serialize_entry("url", &doc.url)?;
        map.serialize_entry("source", &doc.source)?;
        map.serialize_entry("source_kind", &doc.source_kind)?;
        map.serialize_entry("category", &doc.category)?;
        map.serialize_entry("series_tag", &doc.series_tag)?;
        map.serialize_entry("file_kind", &doc.file_kind)?;
        map.serialize_entry("abstract", &doc.abstract_text)?;
        map.serialize_entry("content", &doc.content)?;
        map.serialize_entry("metadata", &doc.metadata)?;
        map.serialize_entry("collected_at", &doc.collected_at)?;
        map.serialize_entry("identity_hash", &doc.identity_hash)?;
        map.end()
    }
}

pub struct ReportWriter {
    path: PathBuf,
    create_backup: bool,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>, create_backup: bool) -> Self {
        Self {
            path: path.into(),
            create_backup,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `results`. A failed backup is logged; a failed write is returned.
    pub fn save(&self, results: &SourceResults) -> Result<Report> {
        if self.create_backup && self.path.exists() {
            match self.backup() {
                Ok(backup) => info!("Backed up previous report to {}", backup.display()),
                Err(e) => warn!("Failed to back up {}: {}", self.path.display(), e),
            }
        }

        let report = Report::from_results(results);
        write_json_atomic(&self.path, &report)?;
        info!(
            "Saved report {} with {} documents from {} sources to {}",
            report.run_id,
            report.total_documents,
            report.total_sources,
            self.path.display()
        );
        Ok(report)
    }

    fn backup(&self) -> Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".backup_{}", stamp));
        let backup = PathBuf::from(name);
        std::fs::copy(&self.path, &backup)?;
        Ok(backup)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total_documents: usize,
    pub by_source: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub by_series: BTreeMap<String, usize>,
    pub by_file_kind: BTreeMap<String, usize>,
}

pub fn stats(results: &SourceResults) -> ReportStats {
    let mut stats = ReportStats::default();
    for (source, documents) in results {
        stats.total_documents += documents.len();
        *stats.by_source.entry(source.clone()).or_default() += documents.len();
        for doc in documents {
            bump(&mut stats.by_category, doc.category.as_deref());
            bump(&mut stats.by_series, doc.series_tag.as_deref());
            bump(&mut stats.by_file_kind, doc.file_kind.as_deref());
        }
    }
    stats
}

fn bump(counts: &mut BTreeMap<String, usize>, key: Option<&str>) {
    *counts.entry(key.unwrap_or(UNKNOWN).to_string()).or_default() += 1;
}
