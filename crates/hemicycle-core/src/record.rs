//! Canonical records written to the per-term artifacts.

use serde::{Deserialize, Serialize};

/// One roll-call vote, keyed by its `uid` in the term-wide mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: String,
    /// `YYYY-MM-DD`, as published.
    pub date: Option<String>,
    /// Vote type code (`SPO`, `SPS`, `MOC`, ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub votes_for: Vec<String>,
    pub votes_against: Vec<String>,
    #[serde(rename = "votes_abs")]
    pub votes_abstain: Vec<String>,
}

/// Snapshot of a political group's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganRef {
    pub id: String,
    pub name: Option<String>,
    pub name_from: Option<String>,
    pub name_short: Option<String>,
    pub color: Option<String>,
}

/// A deputy as accumulated over every vote and transcript of one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeputyRecord {
    pub name: String,
    /// Distinct seat numbers in first-seen order.
    pub chair_numbers: Vec<u32>,
    /// Group of record with the latest effective date seen.
    pub organ: Option<OrganRef>,
    pub speeches: Vec<String>,
}

impl DeputyRecord {
    pub fn new(name: String) -> Self {
        Self {
            name,
            chair_numbers: Vec::new(),
            organ: None,
            speeches: Vec::new(),
        }
    }

    /// Record a seat number unless already present. Returns whether it was new.
    pub fn add_chair(&mut self, chair: u32) -> bool {
        if self.chair_numbers.contains(&chair) {
            return false;
        }
        self.chair_numbers.push(chair);
        true
    }
}
