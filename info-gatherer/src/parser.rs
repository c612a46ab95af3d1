use crate::types::{Candidate, GathererError, Result};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

/// One paper from an arXiv Atom response.
#[derive(Debug, Clone)]
pub struct ArxivEntry {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct FeedParser {
    seen_urls: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_urls: HashSet::new(),
        }
    }

    /// Parse an arXiv API response. Entries missing a title, summary or id
    /// are skipped, as are URLs already returned by this parser.
    pub fn parse_arxiv_feed(&mut self, content: &str) -> Result<Vec<ArxivEntry>> {
        debug!("Parsing arXiv feed ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| GathererError::Parse(format!("Failed to parse feed: {}", e)))?;

        let mut entries = Vec::new();
        for entry in feed.entries {
            if let Some(parsed) = self.parse_entry(entry) {
                entries.push(parsed);
            }
        }

        info!("Parsed arXiv feed with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_entry(&mut self, entry: feed_rs::model::Entry) -> Option<ArxivEntry> {
        let title = entry.title.map(|t| collapse_whitespace(&t.content)).filter(|t| !t.is_empty())?;
        let summary = entry.summary.map(|s| collapse_whitespace(&s.content)).filter(|s| !s.is_empty())?;

        let url = entry.id.trim().to_string();
        if url.is_empty() {
            return None;
        }

        if self.seen_urls.contains(&url) {
            debug!("Skipping duplicate paper: {}", url);
            return None;
        }
        self.seen_urls.insert(url.clone());

        Some(ArxivEntry {
            title,
            summary,
            url,
            authors: entry.authors.into_iter().map(|a| a.name).collect(),
            categories: entry.categories.into_iter().map(|c| c.term).collect(),
            published_at: entry.published.map(|dt| dt.with_timezone(&Utc)),
            updated_at: entry.updated.map(|dt| dt.with_timezone(&Utc)),
        })
    }

    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();
        content_lower.contains("<feed") || content_lower.contains("<rss")
    }

    pub fn clear_deduplication_cache(&mut self) {
        self.seen_urls.clear();
        debug!("Cleared deduplication cache");
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Link candidates on a result page, in document order. The title comes
/// from the `title` attribute when present, the link text otherwise.
pub fn extract_candidates(html: &str) -> Vec<Candidate> {
    let doc = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").expect("static selector");

    let candidates = doc
        .select(&link_selector)
        .filter_map(|link| {
            let href = link.value().attr("href")?.trim();
            let title = link_title(&link)?;
            Some(Candidate::new(title, href))
        })
        .collect::<Vec<_>>();

    debug!("HTML parser found {} link candidates", candidates.len());
    candidates
}

fn link_title(link: &ElementRef<'_>) -> Option<String> {
    let from_attr = link
        .value()
        .attr("title")
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty());
    from_attr.or_else(|| {
        let text = collapse_whitespace(&link.text().collect::<Vec<_>>().join(" "));
        (!text.is_empty()).then_some(text)
    })
}

/// Visible body text with whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("static selector");

    let mut parts = Vec::new();
    for body in doc.select(&body_selector) {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node
                .parent()
                .and_then(|p| p.value().as_element())
                .map(|el| matches!(el.name(), "script" | "style" | "noscript"))
                .unwrap_or(false);
            if !hidden {
                parts.push(&**text);
            }
        }
    }

    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
