use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// How a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceKind {
    WebScraping,
    RestApi,
    RssFeed,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::WebScraping => "web_scraping",
            SourceKind::RestApi => "rest_api",
            SourceKind::RssFeed => "rss_feed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older result files stored the enum repr, e.g. "DataSourceType.API".
        let raw = s.trim();
        let raw = raw.strip_prefix("DataSourceType.").unwrap_or(raw);
        match raw.to_ascii_lowercase().as_str() {
            "web_scraping" => Ok(SourceKind::WebScraping),
            "rest_api" | "api" => Ok(SourceKind::RestApi),
            "rss_feed" => Ok(SourceKind::RssFeed),
            other => Err(format!("unknown source kind: {}", other)),
        }
    }
}

impl TryFrom<String> for SourceKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidDocument {
    #[error("document has an empty name")]
    EmptyName,

    #[error("document {name:?} has an invalid url {url:?}")]
    InvalidUrl { name: String, url: String },
}

/// One discovered document or paper.
///
/// Every persisted shape (snapshot, diff file, report) deserializes into this
/// type. Field aliases accept the names used by older result files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub url: String,
    pub source: String,
    #[serde(alias = "source_type")]
    pub source_kind: SourceKind,
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "fpga_series")]
    pub series_tag: Option<String>,
    #[serde(default, alias = "file_type")]
    pub file_kind: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "api_metadata")]
    pub metadata: Option<serde_json::Value>,
    #[serde(
        default = "Utc::now",
        alias = "scraped_at",
        deserialize_with = "deserialize_timestamp"
    )]
    pub collected_at: DateTime<Utc>,
    #[serde(default, alias = "hash")]
    pub identity_hash: String,
}

impl Document {
    pub fn builder(
        name: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        source_kind: SourceKind,
    ) -> DocumentBuilder {
        DocumentBuilder {
            name: name.into(),
            url: url.into(),
            source: source.into(),
            source_kind,
            search_url: None,
            category: None,
            series_tag: None,
            file_kind: None,
            abstract_text: None,
            content: None,
            metadata: None,
            collected_at: None,
        }
    }

    /// Recompute the identity hash from the current field values.
    pub fn compute_identity_hash(&self) -> String {
        compute_identity_hash(
            &self.name,
            &self.url,
            self.category.as_deref(),
            self.series_tag.as_deref(),
        )
    }

    pub fn validate(&self) -> Result<(), InvalidDocument> {
        if self.name.trim().is_empty() {
            return Err(InvalidDocument::EmptyName);
        }
        match url::Url::parse(&self.url) {
            Ok(parsed) if parsed.has_host() => Ok(()),
            _ => Err(InvalidDocument::InvalidUrl {
                name: self.name.clone(),
                url: self.url.clone(),
            }),
        }
    }

    /// Fill in an identity hash for records persisted without one.
    pub fn normalized(mut self) -> Self {
        if self.identity_hash.is_empty() {
            self.identity_hash = self.compute_identity_hash();
        }
        self
    }
}

/// SHA-256 over `name + url + category + series_tag`, absent values as "".
pub fn compute_identity_hash(
    name: &str,
    url: &str,
    category: Option<&str>,
    series_tag: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(url.as_bytes());
    hasher.update(category.unwrap_or("").as_bytes());
    hasher.update(series_tag.unwrap_or("").as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct DocumentBuilder {
    name: String,
    url: String,
    source: String,
    source_kind: SourceKind,
    search_url: Option<String>,
    category: Option<String>,
    series_tag: Option<String>,
    file_kind: Option<String>,
    abstract_text: Option<String>,
    content: Option<String>,
    metadata: Option<serde_json::Value>,
    collected_at: Option<DateTime<Utc>>,
}

impl DocumentBuilder {
    pub fn search_url(mut self, search_url: impl Into<String>) -> Self {
        self.search_url = Some(search_url.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn series_tag(mut self, series_tag: Option<String>) -> Self {
        self.series_tag = series_tag;
        self
    }

    pub fn file_kind(mut self, file_kind: impl Into<String>) -> Self {
        self.file_kind = Some(file_kind.into());
        self
    }

    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = Some(abstract_text.into());
        self
    }

    pub fn content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn collected_at(mut self, collected_at: DateTime<Utc>) -> Self {
        self.collected_at = Some(collected_at);
        self
    }

    pub fn build(self) -> Document {
        let identity_hash = compute_identity_hash(
            &self.name,
            &self.url,
            self.category.as_deref(),
            self.series_tag.as_deref(),
        );
        Document {
            name: self.name,
            url: self.url,
            source: self.source,
            source_kind: self.source_kind,
            search_url: self.search_url,
            category: self.category,
            series_tag: self.series_tag,
            file_kind: self.file_kind,
            abstract_text: self.abstract_text,
            content: self.content,
            metadata: self.metadata,
            collected_at: self.collected_at.unwrap_or_else(Utc::now),
            identity_hash,
        }
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // Naive local timestamps are read as UTC.
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// Produced by a model backend without detected errors.
    Success,
    /// Produced by a template or degraded path.
    Fallback,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub status: SummaryStatus,
    pub metadata: BTreeMap<String, String>,
}

impl SummaryResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: SummaryStatus::Success,
            metadata: BTreeMap::new(),
        }
    }

    pub fn fallback(text: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("reason".to_string(), reason.into());
        Self {
            text: text.into(),
            status: SummaryStatus::Fallback,
            metadata,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("error".to_string(), error.into());
        Self {
            text: String::new(),
            status: SummaryStatus::Failed,
            metadata,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Only unambiguous model output may be sent to recipients.
    pub fn is_safe_to_send(&self) -> bool {
        self.status == SummaryStatus::Success
            && !self.text.trim().is_empty()
            && !self.metadata.contains_key("error")
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn backend_name(&self) -> String;

    /// Never fails outright; problems are reported through the status.
    async fn summarize(&self, documents: &[Document], language: Language) -> SummaryResult;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn transport_name(&self) -> String;

    async fn notify(&self, message: &NotificationMessage, report_path: &Path) -> anyhow::Result<()>;
}
