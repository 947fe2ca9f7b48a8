//! Storage layer: JSON directory reader/writer, biography lookups, per-term aggregation.

mod error;
pub use error::StoreError;

pub mod aggregate;
pub mod biography;
pub mod files;

pub use aggregate::{VoteSource, aggregate_deputies, aggregate_votes, write_artifact};
pub use biography::DirBiography;
