//! Sync layer: cross-reference collection and cached HTTP fetching of open-data documents.

pub mod refs;
pub use refs::{RefRule, RefScan, collect_refs};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FetchError, FetchOutcome, FetchSummary, Fetcher, PayloadFormat, fetch_all};
