use crate::filter::DocumentFilter;
use crate::traits::PageSource;
use crate::types::{Candidate, Document, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, Copy)]
pub struct AccumulatorLimits {
    pub max_results: usize,
    pub max_pages: usize,
    pub max_consecutive_empty_pages: usize,
}

impl Default for AccumulatorLimits {
    fn default() -> Self {
        Self {
            max_results: 200,
            max_pages: 10,
            max_consecutive_empty_pages: 3,
        }
    }
}

/// Walks a result listing page by page, keeping filtered documents with
/// URLs not seen earlier in the run.
pub struct CandidateAccumulator<'a> {
    filter: &'a DocumentFilter,
    source: String,
    limits: AccumulatorLimits,
    seen_urls: HashSet<String>,
}

impl<'a> CandidateAccumulator<'a> {
    pub fn new(filter: &'a DocumentFilter, source: impl Into<String>, limits: AccumulatorLimits) -> Self {
        Self {
            filter,
            source: source.into(),
            limits,
            seen_urls: HashSet::new(),
        }
    }

    pub async fn accumulate<P>(&mut self, pages: &mut P) -> Result<Vec<Document>>
    where
        P: PageSource + ?Sized,
    {
        let search_url = pages.search_url().to_string();
        let base = Url::parse(&search_url).ok();
        let mut documents = Vec::new();
        let mut scanned = 0;
        let mut empty_streak = 0;

        if self.limits.max_results == 0 {
            return Ok(documents);
        }

        while scanned < self.limits.max_pages {
            let candidates = match pages.fetch_page().await {
                Ok(candidates) => candidates,
                Err(e) if scanned == 0 => return Err(e),
                Err(e) => {
                    warn!("{}: page {} failed, keeping {} documents: {}", self.source, scanned + 1, documents.len(), e);
                    break;
                }
            };
            scanned += 1;

            let added = self.absorb(candidates, base.as_ref(), &search_url, &mut documents);
            debug!("{}: page {} added {} documents ({} total)", self.source, scanned, added, documents.len());

            if documents.len() >= self.limits.max_results {
                documents.truncate(self.limits.max_results);
                info!("{}: reached max_results {}", self.source, self.limits.max_results);
                break;
            }

            if added == 0 {
                empty_streak += 1;
                if empty_streak >= self.limits.max_consecutive_empty_pages {
                    info!("{}: no new documents on {} consecutive pages", self.source, empty_streak);
                    break;
                }
            } else {
                empty_streak = 0;
            }

            if scanned >= self.limits.max_pages {
                break;
            }

            match pages.advance().await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("{}: listing has no further pages", self.source);
                    break;
                }
                Err(e) => {
                    warn!("{}: advancing past page {} failed: {}", self.source, scanned, e);
                    break;
                }
            }
        }

        info!("{}: collected {} documents from {} pages", self.source, documents.len(), scanned);
        Ok(documents)
    }

    fn absorb(
        &mut self,
        candidates: Vec<Candidate>,
        base: Option<&Url>,
        search_url: &str,
        documents: &mut Vec<Document>,
    ) -> usize {
        let mut added = 0;
        for candidate in candidates {
            let Some(url) = resolve_href(base, &candidate.url) else {
                continue;
            };
            if self.seen_urls.contains(&url) {
                continue;
            }

            let candidate = Candidate::new(candidate.title.trim(), url);
            if !self.filter.accepts(&candidate) {
                continue;
            }

            self.seen_urls.insert(candidate.url.clone());
            documents.push(self.filter.to_document(&candidate, &self.source, search_url));
            added += 1;
        }
        added
    }

    pub fn seen_count(&self) -> usize {
        self.seen_urls.len()
    }
}

/// Absolute URL for an href found on a page opened at `base`.
pub fn resolve_href(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.and_then(|b| b.join(href).ok()).map(|u| u.to_string()),
        Err(_) => None,
    }
}
