pub mod types;
pub mod traits;
pub mod filter;
pub mod accumulator;
pub mod parser;
pub mod fetcher;
pub mod browser;
pub mod content;
pub mod sources;
pub mod snapshot;
pub mod retry;
pub mod report;
pub mod summarizer;
pub mod notify;
pub mod markdown;
pub mod aggregator;
pub mod utils;

pub use types::*;
pub use traits::{Collector, PageSource};
pub use filter::{DocumentFilter, RelevancePolicy, VendorProfile};
pub use accumulator::{AccumulatorLimits, CandidateAccumulator};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use snapshot::{SnapshotState, SnapshotStore};
pub use retry::RetryPolicy;
pub use report::{Report, ReportWriter, SourceResults};
pub use notify::{LogNotifier, NotifyOutcome};
pub use aggregator::{InfoGatherer, RunOutcome};
