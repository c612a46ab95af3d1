pub mod baseline;
pub mod defs;

pub use baseline::BaselineSummarizer;
pub use defs::{
    compute_identity_hash, Document, DocumentBuilder, InvalidDocument, Language,
    NotificationMessage, Notifier, SourceKind, Summarizer, SummaryResult, SummaryStatus,
};
