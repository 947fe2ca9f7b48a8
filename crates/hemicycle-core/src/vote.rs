//! Roll-call vote (scrutin) extraction.
//!
//! Two layouts exist upstream:
//!
//! - per-file terms wrap each vote as `{"scrutin": {...}}`;
//! - the oldest term lists bare scrutins under `scrutins.scrutin`.
//!
//! Category keys also drift between eras (`pours` / `pour`, `contres` /
//! `contre`, ...). [`parse_scrutin`] accepts all of it and never fails: a
//! branch with the wrong shape contributes nothing and its siblings are still
//! read. [`normalize_vote`] then applies the one hard requirement, a `uid`.

use serde_json::Value;

use crate::record::VoteRecord;
use crate::shape::{self, Shape};
use crate::skip::SkipReason;

/// A voter's position in one roll-call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    For,
    Against,
    Abstain,
    NonVoting,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::For,
        Position::Against,
        Position::Abstain,
        Position::NonVoting,
    ];

    /// Accepted spellings, plural first.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Position::For => &["pours", "pour"],
            Position::Against => &["contres", "contre"],
            Position::Abstain => &["abstentions", "abstention"],
            Position::NonVoting => &["nonVotants", "nonVotant"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub actor_ref: String,
    pub chair_number: Option<u32>,
}

/// Nominative breakdown of one political group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupBallot {
    pub organ_ref: Option<String>,
    pub voters: Vec<(Position, Voter)>,
}

impl GroupBallot {
    pub fn in_position(&self, position: Position) -> impl Iterator<Item = &Voter> {
        self.voters
            .iter()
            .filter(move |(p, _)| *p == position)
            .map(|(_, v)| v)
    }
}

/// Everything the pipeline reads from one vote document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scrutin {
    pub id: Option<String>,
    pub date: Option<String>,
    pub kind: Option<String>,
    pub groups: Vec<GroupBallot>,
}

impl Scrutin {
    /// Actor refs in `position`, concatenated across groups in document order.
    /// Duplicates across groups are kept.
    pub fn actor_refs(&self, position: Position) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.in_position(position))
            .map(|v| v.actor_ref.clone())
            .collect()
    }

    pub fn into_record(self) -> Result<VoteRecord, SkipReason> {
        let votes_for = self.actor_refs(Position::For);
        let votes_against = self.actor_refs(Position::Against);
        let votes_abstain = self.actor_refs(Position::Abstain);
        let id = self.id.ok_or(SkipReason::MissingKey { key: "uid" })?;
        Ok(VoteRecord {
            id,
            date: self.date,
            kind: self.kind,
            votes_for,
            votes_against,
            votes_abstain,
        })
    }
}

/// The scrutin body of a document, whether wrapped or bare.
pub fn scrutin_body(doc: &Value) -> &Value {
    doc.get("scrutin").filter(|v| v.is_object()).unwrap_or(doc)
}

/// Read a vote document as far as its shape allows.
pub fn parse_scrutin(doc: &Value) -> Scrutin {
    let body = scrutin_body(doc);
    Scrutin {
        id: shape::text(body.get("uid")),
        date: shape::text(body.get("dateScrutin")),
        kind: shape::path(body, &["typeVote", "codeTypeVote"]).and_then(|v| shape::text(Some(v))),
        groups: parse_groups(body),
    }
}

/// Canonical record for one vote document, or why it cannot be keyed.
pub fn normalize_vote(doc: &Value) -> Result<VoteRecord, SkipReason> {
    if !scrutin_body(doc).is_object() {
        return Err(SkipReason::malformed("vote document is not a JSON object"));
    }
    parse_scrutin(doc).into_record()
}

fn parse_groups(body: &Value) -> Vec<GroupBallot> {
    let Some(groupes) = shape::object_at(body, &["ventilationVotes", "organe", "groupes"]) else {
        return Vec::new();
    };
    Shape::of(groupes.get("groupe"))
        .objects()
        .into_iter()
        .map(parse_group)
        .collect()
}

fn parse_group(group: &Value) -> GroupBallot {
    let organ_ref = shape::text(group.get("organeRef"));
    let Some(decompte) = shape::object_at(group, &["vote", "decompteNominatif"]) else {
        return GroupBallot {
            organ_ref,
            voters: Vec::new(),
        };
    };

    let mut voters = Vec::new();
    for position in Position::ALL {
        let Some(category) = shape::field(decompte, position.keys()).filter(|v| v.is_object())
        else {
            continue;
        };
        for votant in Shape::of(category.get("votant")).objects() {
            let Some(actor_ref) = shape::text(votant.get("acteurRef")) else {
                continue;
            };
            voters.push((
                position,
                Voter {
                    actor_ref,
                    chair_number: shape::unsigned(votant.get("numPlace")),
                },
            ));
        }
    }
    GroupBallot { organ_ref, voters }
}
