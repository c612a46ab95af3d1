use crate::report::SourceResults;
use crate::types::{Document, Language, NotificationMessage, Notifier, Summarizer, SummaryResult};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use chrono::Local;
use std::path::Path;
use tracing::{error, info, warn};

const ABSTRACT_PREVIEW_CHARS: usize = 200;

/// What happened to a run's notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// The summary was not safe to send; carries the summary status.
    Suppressed(String),
    Failed(String),
}

pub fn should_notify(summary: &SummaryResult) -> bool {
    summary.is_safe_to_send()
}

pub fn compose_message(results: &SourceResults, summary: &SummaryResult) -> NotificationMessage {
    let now = Local::now();
    let subject = format!("FPGA IP Document Scan Results - {}", now.format("%Y-%m-%d %H:%M"));

    let mut body = String::from("FPGA IP Document Scan Results\n");
    body.push_str(&"=".repeat(50));
    body.push_str("\n\n");

    if !summary.text.trim().is_empty() {
        body.push_str("Summary\n");
        body.push_str(&"-".repeat(30));
        body.push('\n');
        body.push_str(summary.text.trim());
        body.push_str("\n\n");
    }

    let mut total = 0;
    for (source, documents) in results {
        body.push_str(&format!("Source: {}\n", source.to_uppercase()));
        body.push_str(&"-".repeat(30));
        body.push('\n');

        if documents.is_empty() {
            body.push_str("No documents found.\n\n");
            continue;
        }

        total += documents.len();
        for doc in documents {
            push_document(&mut body, doc);
        }
    }

    body.push_str(&format!("Total Documents Found: {}\n", total));
    body.push_str(&format!("Scan Date: {}\n", now.format("%Y-%m-%d %H:%M:%S")));

    NotificationMessage { subject, body }
}

fn push_document(body: &mut String, doc: &Document) {
    body.push_str(&format!("• {}\n", doc.name));
    body.push_str(&format!("  URL: {}\n", doc.url));
    if let Some(category) = &doc.category {
        body.push_str(&format!("  Category: {}\n", category));
    }
    if let Some(series) = &doc.series_tag {
        body.push_str(&format!("  FPGA Series: {}\n", series));
    }
    if let Some(kind) = &doc.file_kind {
        body.push_str(&format!("  File Type: {}\n", kind));
    }
    if let Some(text) = &doc.abstract_text {
        body.push_str(&format!("  Abstract: {}\n", truncate_chars(text, ABSTRACT_PREVIEW_CHARS)));
    }
    body.push('\n');
}

/// Summarize `results` and hand the message to `notifier` when the summary
/// may be sent. Nothing here is allowed to fail the run.
pub async fn deliver(
    summarizer: &dyn Summarizer,
    notifier: &dyn Notifier,
    results: &SourceResults,
    language: Language,
    report_path: &Path,
) -> NotifyOutcome {
    let documents = results.values().flatten().cloned().collect::<Vec<_>>();
    let summary = summarizer.summarize(&documents, language).await;
    info!(
        "{} summary finished with status {:?}",
        summarizer.backend_name(),
        summary.status
    );

    if !should_notify(&summary) {
        warn!(
            "Not sending notification: summary status {:?} from {}",
            summary.status,
            summarizer.backend_name()
        );
        return NotifyOutcome::Suppressed(format!("{:?}", summary.status));
    }

    let message = compose_message(results, &summary);
    match notifier.notify(&message, report_path).await {
        Ok(()) => {
            info!("Notification sent via {}", notifier.transport_name());
            NotifyOutcome::Sent
        }
        Err(e) => {
            error!("Notification via {} failed: {}", notifier.transport_name(), e);
            NotifyOutcome::Failed(e.to_string())
        }
    }
}

/// Writes the message to the log instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn transport_name(&self) -> String {
        "log".to_string()
    }

    async fn notify(&self, message: &NotificationMessage, report_path: &Path) -> anyhow::Result<()> {
        info!(
            "{} (report: {})\n{}",
            message.subject,
            report_path.display(),
            message.body
        );
        Ok(())
    }
}
