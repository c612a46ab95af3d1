use crate::fetcher::Fetcher;
use crate::markdown;
use crate::notify::{deliver, LogNotifier, NotifyOutcome};
use crate::report::{stats, Report, ReportStats, ReportWriter, SourceResults};
use crate::retry::{collect_with_retry, RetryPolicy};
use crate::sources::build_collector;
use crate::summarizer::build_summarizer;
use crate::traits::Collector;
use crate::types::{GathererConfig, NotificationConfig, Notifier, Result, Summarizer};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Everything one run produced after the report was written.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    pub stats: ReportStats,
    /// `None` when notifications were not attempted.
    pub notification: Option<NotifyOutcome>,
}

/// Runs collectors one after another and persists what they return.
///
/// A failing source never aborts the run: after its retries are used up it
/// is reported with no documents.
pub struct InfoGatherer {
    collectors: IndexMap<String, Box<dyn Collector>>,
    default_sources: Vec<String>,
    summarizer: Box<dyn Summarizer>,
    notifier: Box<dyn Notifier>,
    notifications: NotificationConfig,
    retry: RetryPolicy,
    report_writer: ReportWriter,
    markdown_path: Option<PathBuf>,
}

impl InfoGatherer {
    /// An orchestrator with no collectors, using the configured summarizer
    /// and a log-only notifier.
    pub fn new(config: &GathererConfig) -> Result<Self> {
        Ok(Self {
            collectors: IndexMap::new(),
            default_sources: Vec::new(),
            summarizer: build_summarizer(&config.summarizer)?,
            notifier: Box::new(LogNotifier),
            notifications: config.notifications.clone(),
            retry: RetryPolicy::from(&config.retry),
            report_writer: ReportWriter::new(&config.output.report_path, config.output.create_backup),
            markdown_path: config.output.markdown_path.clone(),
        })
    }

    /// Build every configured source. Disabled sources are only run when
    /// asked for by name.
    pub fn from_config(config: &GathererConfig) -> Result<Self> {
        let mut gatherer = Self::new(config)?;
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);

        for source in &config.sources {
            let collector = build_collector(source, config, fetcher.clone())?;
            gatherer.register(collector, source.enabled);
        }

        info!(
            "Configured {} sources ({} enabled by default)",
            gatherer.collectors.len(),
            gatherer.default_sources.len()
        );
        Ok(gatherer)
    }

    pub fn with_collector(mut self, collector: Box<dyn Collector>) -> Self {
        self.register(collector, true);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn register(&mut self, collector: Box<dyn Collector>, default: bool) {
        let id = collector.source_id();
        if default && !self.default_sources.contains(&id) {
            self.default_sources.push(id.clone());
        }
        self.collectors.insert(id, collector);
    }

    pub fn source_names(&self) -> Vec<String> {
        self.collectors.keys().cloned().collect()
    }

    /// Collect from `requested` sources (all enabled ones when `None`), in
    /// request order. Unknown names are skipped. A source that fails with a
    /// non-retryable error stops the collection.
    pub async fn run_collection(&mut self, requested: Option<&[String]>) -> Result<SourceResults> {
        let names = match requested {
            Some(names) => names.to_vec(),
            None => self.default_sources.clone(),
        };

        let mut results = SourceResults::new();
        let mut visited = HashSet::new();

        for name in names {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(collector) = self.collectors.get_mut(&name) else {
                warn!("Unknown source {:?}, skipping", name);
                continue;
            };

            info!("Starting collection for {}", collector.source_name());
            let documents = collect_with_retry(collector.as_mut(), &self.retry).await?;
            if documents.is_empty() {
                warn!("{}: no documents collected", name);
            } else {
                info!("{}: collected {} documents", name, documents.len());
            }
            results.insert(name, documents);

            let pause = collector.rate_limit_seconds();
            if pause > 0 {
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }
        }

        Ok(results)
    }

    /// Persist `results`, then summarize and notify when `notify` is set
    /// and notifications are enabled. Only a failed report write is an error.
    pub async fn process_and_notify(&self, results: &SourceResults, notify: bool) -> Result<RunOutcome> {
        let report = self.report_writer.save(results)?;

        if let Some(path) = &self.markdown_path {
            match markdown::write_report(&report, path) {
                Ok(()) => info!("Wrote Markdown report to {}", path.display()),
                Err(e) => warn!("Failed to write Markdown report {}: {}", path.display(), e),
            }
        }

        let stats = stats(results);
        info!("Run totals: {} documents", stats.total_documents);
        for (source, count) in &stats.by_source {
            info!("  {}: {}", source, count);
        }

        let notification = if notify && self.notifications.enabled {
            let outcome = deliver(
                self.summarizer.as_ref(),
                self.notifier.as_ref(),
                results,
                self.notifications.language,
                self.report_writer.path(),
            )
            .await;
            Some(outcome)
        } else {
            info!("Notifications disabled for this run");
            None
        };

        Ok(RunOutcome {
            report,
            stats,
            notification,
        })
    }

    pub async fn run(&mut self, requested: Option<&[String]>, notify: bool) -> Result<RunOutcome> {
        let results = match self.run_collection(requested).await {
            Ok(results) => results,
            Err(e) => {
                error!("Collection aborted: {}", e);
                return Err(e);
            }
        };
        match self.process_and_notify(&results, notify).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Failed to persist results: {}", e);
                Err(e)
            }
        }
    }
}
