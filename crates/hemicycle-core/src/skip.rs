//! Skip reasons and the per-batch report they accumulate into.

use std::collections::BTreeMap;

use thiserror::Error;

/// Why one record, branch, voter or file was left out of a batch.
///
/// None of these abort the batch; the enclosing unit is dropped and its
/// siblings carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing key `{key}`")]
    MissingKey { key: &'static str },

    #[error("malformed input: {detail}")]
    Malformed { detail: String },

    #[error("no biography for actor {id}")]
    UnknownActor { id: String },

    #[error("no record for organ {id}")]
    UnknownOrgan { id: String },
}

impl SkipReason {
    pub fn malformed(detail: impl Into<String>) -> Self {
        SkipReason::Malformed {
            detail: detail.into(),
        }
    }

    /// Short stable label used to group skips in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::MissingKey { .. } => "missing-key",
            SkipReason::Malformed { .. } => "malformed",
            SkipReason::UnknownActor { .. } => "unknown-actor",
            SkipReason::UnknownOrgan { .. } => "unknown-organ",
        }
    }
}

/// A skipped unit and where it came from (usually a file name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub source: String,
    pub reason: SkipReason,
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Documents handed to a normalizer.
    pub processed: usize,
    /// Records present in the final mapping.
    pub records: usize,
    pub skipped: Vec<Skip>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(&mut self, source: impl Into<String>, reason: SkipReason) {
        self.skipped.push(Skip {
            source: source.into(),
            reason,
        });
    }

    /// Fold another report into this one. Record counts are not summed since
    /// both usually describe the same output mapping.
    pub fn absorb(&mut self, other: BatchReport) {
        self.processed += other.processed;
        self.skipped.extend(other.skipped);
    }

    /// Number of skips per [`SkipReason::kind`].
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for skip in &self.skipped {
            *counts.entry(skip.reason.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
