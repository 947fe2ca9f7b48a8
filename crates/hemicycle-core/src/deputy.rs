//! Deputy table: folds votes and transcripts into one record per actor.
//!
//! A [`DeputyTable`] is the aggregation context of a single term run. It is
//! created empty, fed every vote and transcript of the term, and consumed by
//! [`DeputyTable::finish`]. Records are created lazily through a
//! [`Biography`]; an actor without a biography is never tracked.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::record::{DeputyRecord, OrganRef};
use crate::transcript;
use crate::vote::{Position, Scrutin};

/// Date assumed for votes that do not carry `dateScrutin`.
pub const FALLBACK_DATE: &str = "1900-01-01";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Side lookups by identifier, independent of the vote and transcript files.
pub trait Biography {
    /// Display name of an actor (`"<nom> <prenom>"`), if known.
    fn deputy_name(&self, actor_id: &str) -> Option<String>;

    /// Identity of a political group, if known.
    fn organ(&self, organ_id: &str) -> Option<OrganRef>;
}

/// Identifiers that could not be resolved during a run, each listed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unresolved {
    pub actors: BTreeSet<String>,
    pub organs: BTreeSet<String>,
}

struct Entry {
    record: DeputyRecord,
    /// Effective date of `record.organ`; never serialized.
    organ_since: Option<NaiveDate>,
}

#[derive(Default)]
pub struct DeputyTable {
    entries: BTreeMap<String, Entry>,
    unresolved: Unresolved,
}

impl DeputyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, actor_id: &str) -> Option<&DeputyRecord> {
        self.entries.get(actor_id).map(|e| &e.record)
    }

    /// Fold one vote: seat numbers and group of record for every voter of
    /// every group whose organ resolves.
    pub fn fold_vote<B: Biography + ?Sized>(&mut self, scrutin: &Scrutin, bio: &B) {
        let raw_date = scrutin.date.as_deref().unwrap_or(FALLBACK_DATE);
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).ok();
        if date.is_none() {
            debug!(date = raw_date, vote = ?scrutin.id, "unparseable vote date");
        }

        for group in &scrutin.groups {
            let Some(organ_id) = group.organ_ref.as_deref() else {
                continue;
            };
            let Some(organ) = self.resolve_organ(organ_id, bio) else {
                continue;
            };

            for position in Position::ALL {
                for voter in group.in_position(position) {
                    let Some(entry) = self.entry(&voter.actor_ref, bio) else {
                        continue;
                    };
                    if let Some(chair) = voter.chair_number {
                        entry.record.add_chair(chair);
                    }
                    assign_organ(entry, &organ, date);
                }
            }
        }
    }

    /// Fold one transcript document. Returns the number of speeches appended.
    pub fn fold_transcript<B: Biography + ?Sized>(&mut self, doc: &Value, bio: &B) -> usize {
        let mut appended = 0;
        for speech in transcript::speeches(doc) {
            if let Some(entry) = self.entry(&speech.actor_id, bio) {
                entry.record.speeches.push(speech.text);
                appended += 1;
            }
        }
        appended
    }

    /// Drop the effective-date bookkeeping and hand back the public records.
    pub fn finish(self) -> (BTreeMap<String, DeputyRecord>, Unresolved) {
        let records = self
            .entries
            .into_iter()
            .map(|(id, entry)| (id, entry.record))
            .collect();
        (records, self.unresolved)
    }

    fn entry<B: Biography + ?Sized>(&mut self, actor_id: &str, bio: &B) -> Option<&mut Entry> {
        if !self.entries.contains_key(actor_id) {
            if self.unresolved.actors.contains(actor_id) {
                return None;
            }
            let Some(name) = bio.deputy_name(actor_id) else {
                debug!(actor = actor_id, "no biography, actor skipped");
                self.unresolved.actors.insert(actor_id.to_string());
                return None;
            };
            self.entries.insert(
                actor_id.to_string(),
                Entry {
                    record: DeputyRecord::new(name),
                    organ_since: None,
                },
            );
        }
        self.entries.get_mut(actor_id)
    }

    fn resolve_organ<B: Biography + ?Sized>(&mut self, organ_id: &str, bio: &B) -> Option<OrganRef> {
        if self.unresolved.organs.contains(organ_id) {
            return None;
        }
        let organ = bio.organ(organ_id);
        if organ.is_none() {
            debug!(organ = organ_id, "unknown organ, group skipped");
            self.unresolved.organs.insert(organ_id.to_string());
        }
        organ
    }
}

/// Last writer by effective date: a new assignment replaces the stored one
/// only when strictly later. An undated assignment only fills an empty slot.
fn assign_organ(entry: &mut Entry, organ: &OrganRef, date: Option<NaiveDate>) {
    let newer = match (&entry.record.organ, entry.organ_since, date) {
        (None, _, _) => true,
        (Some(_), _, None) => false,
        (Some(_), None, Some(_)) => true,
        (Some(_), Some(since), Some(date)) => date > since,
    };
    if newer {
        entry.record.organ = Some(organ.clone());
        entry.organ_since = date;
    }
}
