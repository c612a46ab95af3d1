use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use interfaces::defs::{
    Document, Language, NotificationMessage, Notifier, SourceKind, Summarizer, SummaryResult,
    SummaryStatus,
};

/// Environment variable that overrides `browser.webdriver_url`.
pub const WEBDRIVER_URL_ENV: &str = "WEBDRIVER_URL";

/// A raw link scraped from a result page, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
    /// Minimum spacing between two requests to the same host.
    pub min_host_interval_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "InfoGatherer/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 5,
            max_redirects: 5,
            min_host_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub page_load_timeout_seconds: u64,
    /// Pause after each scroll so lazily loaded results can render.
    pub settle_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            page_load_timeout_seconds: 30,
            settle_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub report_path: PathBuf,
    pub create_backup: bool,
    pub snapshot_dir: PathBuf,
    pub markdown_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("results/fpga_documents.json"),
            create_backup: true,
            snapshot_dir: PathBuf::from("results"),
            markdown_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SummarizerConfig {
    Template,
    LocalModel {
        endpoint: String,
        model: String,
        #[serde(default = "default_model_timeout")]
        timeout_seconds: u64,
    },
}

fn default_model_timeout() -> u64 {
    120
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        SummarizerConfig::Template
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XilinxSearch {
    pub base_url: String,
    pub query: String,
    pub document_types: Vec<String>,
    pub product_types: Vec<String>,
    pub date_filter: String,
    pub content_lang: String,
}

impl Default for XilinxSearch {
    fn default() -> Self {
        Self {
            base_url: "https://docs.amd.com/search/all".to_string(),
            query: "Versal".to_string(),
            document_types: vec!["Data Sheet".to_string(), "User Guides & Manuals".to_string()],
            product_types: vec!["IP Cores (Adaptive SoC & FPGA)".to_string()],
            date_filter: "last_month".to_string(),
            content_lang: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlteraSearch {
    pub base_url: String,
    pub query: String,
    pub sort: String,
    /// Documents whose fetched text is shorter than this get generated content.
    pub min_content_chars: usize,
}

impl Default for AlteraSearch {
    fn default() -> Self {
        Self {
            base_url: "https://www.intel.com/content/www/us/en/search.html".to_string(),
            query: "DSP".to_string(),
            sort: "Relevancy".to_string(),
            min_content_chars: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArxivSearch {
    pub base_url: String,
    pub categories: Vec<String>,
    pub sort_by: String,
    pub sort_order: String,
    /// When false every listed paper is returned and no snapshot is kept.
    pub enable_diff: bool,
}

impl Default for ArxivSearch {
    fn default() -> Self {
        Self {
            base_url: "http://export.arxiv.org/api/query".to_string(),
            categories: vec!["cs.AR".to_string(), "cs.AI".to_string()],
            sort_by: "lastUpdatedDate".to_string(),
            sort_order: "descending".to_string(),
            enable_diff: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectorConfig {
    Xilinx(XilinxSearch),
    Altera(AlteraSearch),
    Arxiv(ArxivSearch),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_max_empty_pages")]
    pub max_consecutive_empty_pages: usize,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_seconds: u64,
    #[serde(default)]
    pub excluded_patterns: Vec<String>,
    pub collector: CollectorConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_max_results() -> usize {
    200
}

fn default_max_pages() -> usize {
    10
}

fn default_max_empty_pages() -> usize {
    3
}

fn default_rate_limit() -> u64 {
    1
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, collector: CollectorConfig) -> Self {
        Self {
            name: name.into(),
            enabled: default_enabled(),
            max_results: default_max_results(),
            max_pages: default_max_pages(),
            max_consecutive_empty_pages: default_max_empty_pages(),
            rate_limit_seconds: default_rate_limit(),
            excluded_patterns: Vec::new(),
            collector,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GathererConfig {
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    pub retry: RetryConfig,
    pub notifications: NotificationConfig,
    pub summarizer: SummarizerConfig,
    pub sources: Vec<SourceConfig>,
}

impl Default for GathererConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
            output: OutputConfig::default(),
            retry: RetryConfig::default(),
            notifications: NotificationConfig::default(),
            summarizer: SummarizerConfig::default(),
            sources: vec![
                SourceConfig::new("xilinx", CollectorConfig::Xilinx(XilinxSearch::default())),
                SourceConfig::new("altera", CollectorConfig::Altera(AlteraSearch::default())),
                SourceConfig::new("arxiv", CollectorConfig::Arxiv(ArxivSearch::default()))
                    .with_max_results(10),
            ],
        }
    }
}

impl GathererConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: GathererConfig = serde_json::from_str(&raw)?;
        config.apply_env_overrides();
        config.check()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(WEBDRIVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.browser.webdriver_url = url;
            }
        }
    }

    fn check(&self) -> Result<()> {
        let mut names = std::collections::HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(GathererError::Config("source with an empty name".to_string()));
            }
            if !names.insert(source.name.as_str()) {
                return Err(GathererError::Config(format!(
                    "source {:?} is configured twice",
                    source.name
                )));
            }
        }
        Ok(())
    }

    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn enabled_source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.output.snapshot_dir.join("arxiv_previous_papers.json")
    }

    pub fn diff_path(&self) -> PathBuf {
        self.output.snapshot_dir.join("arxiv_diff_papers.json")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GathererError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("WebDriver session error: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("Browser command error: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid document: {0}")]
    Validation(#[from] interfaces::defs::InvalidDocument),

    #[error("General error: {0}")]
    General(String),

    /// Run state could not be written. Never retried.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl GathererError {
    pub fn persistence(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        GathererError::Persistence(format!("{}: {}", path.display(), cause))
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, GathererError::Persistence(_))
    }
}

pub type Result<T> = std::result::Result<T, GathererError>;
