use async_trait::async_trait;

use crate::defs::Document;
use crate::defs::Language;
use crate::defs::Summarizer;
use crate::defs::SummaryResult;

const MAX_LISTED: usize = 20;

struct Headline {
    pub title: String,
    pub detail: String,
}

fn headline(document: &Document) -> Headline {
    let detail = document
        .abstract_text
        .as_deref()
        .or(document.content.as_deref())
        .map(first_sentence)
        .unwrap_or_default();
    Headline {
        title: document.name.clone(),
        detail,
    }
}

fn first_sentence(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.find(". ") {
        Some(end) => flat[..=end].to_string(),
        None => flat,
    }
}

fn compose(language: Language, headlines: &[Headline], total: usize) -> String {
    let intro = match language {
        Language::En => format!("{} new item(s) collected.", total),
        Language::Ja => format!("新着 {} 件", total),
    };
    let mut lines = vec![intro];
    for headline in headlines {
        if headline.detail.is_empty() {
            lines.push(format!("- {}", headline.title));
        } else {
            lines.push(format!("- {}: {}", headline.title, headline.detail));
        }
    }
    if total > headlines.len() {
        lines.push(format!("... and {} more", total - headlines.len()));
    }
    lines.join("\n")
}

/// Template listing used when no model backend is reachable.
pub struct BaselineSummarizer;

#[async_trait]
impl Summarizer for BaselineSummarizer {
    fn backend_name(&self) -> String {
        "baseline".to_string()
    }

    async fn summarize(&self, documents: &[Document], language: Language) -> SummaryResult {
        let headlines = documents.iter().take(MAX_LISTED).map(headline).collect::<Vec<_>>();
        SummaryResult::fallback(compose(language, &headlines, documents.len()), "template")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::SourceKind;
    use crate::defs::SummaryStatus;

    #[tokio::test]
    async fn baseline_is_never_safe_to_send() {
        let docs = vec![
            Document::builder("Paper A", "http://arxiv.org/abs/1", "arxiv", SourceKind::RestApi)
                .abstract_text("First finding. Second finding.")
                .build(),
        ];
        let result = BaselineSummarizer.summarize(&docs, Language::En).await;
        assert_eq!(result.status, SummaryStatus::Fallback);
        assert!(result.text.contains("- Paper A: First finding."));
        assert!(!result.is_safe_to_send());
    }
}
