use async_trait::async_trait;
use info_gatherer::{
    AccumulatorLimits, Candidate, CandidateAccumulator, DocumentFilter, GathererError, PageSource, Result,
    VendorProfile,
};
use std::collections::HashSet;
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

const SEARCH_URL: &str = "https://docs.amd.com/search/all?query=Versal";

/// Serves canned pages; once past the last page it either stops or keeps
/// serving the last page, like a listing that never stops "loading more".
struct ScriptedPages {
    pages: Vec<Vec<Candidate>>,
    current: usize,
    repeat_last: bool,
    fail_at: Option<usize>,
    fetches: usize,
}

impl ScriptedPages {
    fn new(pages: Vec<Vec<Candidate>>) -> Self {
        Self {
            pages,
            current: 0,
            repeat_last: false,
            fail_at: None,
            fetches: 0,
        }
    }

    fn repeating(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    fn failing_at(mut self, page: usize) -> Self {
        self.fail_at = Some(page);
        self
    }
}

#[async_trait]
impl PageSource for ScriptedPages {
    fn search_url(&self) -> &str {
        SEARCH_URL
    }

    async fn fetch_page(&mut self) -> Result<Vec<Candidate>> {
        self.fetches += 1;
        if self.fail_at == Some(self.current) {
            return Err(GathererError::General("listing unavailable".to_string()));
        }
        Ok(self.pages.get(self.current).cloned().unwrap_or_default())
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            Ok(true)
        } else {
            Ok(self.repeat_last)
        }
    }
}

fn guide(n: usize) -> Candidate {
    Candidate::new(
        format!("Versal Core {} Product Guide", n),
        format!("https://docs.amd.com/r/en-US/pg{}-versal-core", n),
    )
}

fn xilinx_filter() -> DocumentFilter {
    DocumentFilter::new(VendorProfile::xilinx(), &[]).unwrap()
}

fn limits(max_results: usize, max_pages: usize) -> AccumulatorLimits {
    AccumulatorLimits {
        max_results,
        max_pages,
        max_consecutive_empty_pages: 3,
    }
}

#[tokio::test]
async fn test_results_are_unique_and_bounded() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![
        vec![guide(1), guide(2), guide(2), guide(3)],
        vec![guide(3), guide(4), guide(1)],
        vec![guide(5), guide(6), guide(7)],
    ]);
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(5, 10));

    let documents = accumulator.accumulate(&mut pages).await.unwrap();

    assert_eq!(documents.len(), 5);
    let urls = documents.iter().map(|d| d.url.as_str()).collect::<HashSet<_>>();
    assert_eq!(urls.len(), documents.len());
    assert_eq!(documents[0].url, "https://docs.amd.com/r/en-US/pg1-versal-core");
    assert!(documents.iter().all(|d| d.search_url.as_deref() == Some(SEARCH_URL)));
    assert!(documents.iter().all(|d| d.source == "xilinx"));
    info!("Accumulated {} unique documents", documents.len());
}

#[tokio::test]
async fn test_repeating_listing_terminates() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![vec![guide(1), guide(2)]]).repeating();
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(200, 100));

    let documents = accumulator.accumulate(&mut pages).await.unwrap();

    assert_eq!(documents.len(), 2);
    // One productive page, then three pages with nothing new.
    assert_eq!(pages.fetches, 4);
}

#[tokio::test]
async fn test_max_pages_limits_scanning() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![vec![guide(1)], vec![guide(2)], vec![guide(3)], vec![guide(4)]]);
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(200, 2));

    let documents = accumulator.accumulate(&mut pages).await.unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(pages.fetches, 2);
}

#[tokio::test]
async fn test_zero_max_results_collects_nothing() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![vec![guide(1)]]);
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(0, 10));

    let documents = accumulator.accumulate(&mut pages).await.unwrap();

    assert!(documents.is_empty());
    assert_eq!(pages.fetches, 0);
}

#[tokio::test]
async fn test_first_page_error_is_returned() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![vec![guide(1)]]).failing_at(0);
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(200, 10));

    assert!(accumulator.accumulate(&mut pages).await.is_err());
}

#[tokio::test]
async fn test_later_page_error_keeps_partial_results() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![vec![guide(1), guide(2)], vec![guide(3)]]).failing_at(1);
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(200, 10));

    let documents = accumulator.accumulate(&mut pages).await.unwrap();

    assert_eq!(documents.len(), 2);
}

#[tokio::test]
async fn test_relative_links_resolved_and_noise_dropped() {
    init_tracing();

    let mut pages = ScriptedPages::new(vec![vec![
        Candidate::new("Versal Clocking Resources User Guide", "/r/en-US/am003-versal-clocking"),
        Candidate::new("Back to top", "#top"),
        Candidate::new("Open chat", "javascript:void(0)"),
        Candidate::new("Privacy Policy", "https://www.amd.com/en/legal/privacy.html"),
        Candidate::new("Glossary", "https://docs.amd.com/r/en-US/glossary-terms"),
    ]]);
    let filter = xilinx_filter();
    let mut accumulator = CandidateAccumulator::new(&filter, "xilinx", limits(200, 10));

    let documents = accumulator.accumulate(&mut pages).await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].url, "https://docs.amd.com/r/en-US/am003-versal-clocking");
    assert_eq!(documents[0].category.as_deref(), Some("User Guide"));
    assert_eq!(documents[0].series_tag.as_deref(), Some("Versal"));
    assert_eq!(accumulator.seen_count(), 1);
}
