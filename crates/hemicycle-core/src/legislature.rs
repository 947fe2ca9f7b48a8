//! Fixed per-term configuration. Paths are relative to the data directory.

/// Where a term's vote documents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteLayout {
    /// One `{"scrutin": ...}` document per file.
    Folder(&'static str),
    /// Every vote in one file, under `scrutins.scrutin`.
    SingleFile(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Legislature {
    pub term: u8,
    pub votes: VoteLayout,
    /// Session (réunion) documents scanned for transcript references.
    pub reunions: Option<&'static str>,
    /// Cache directory for downloaded transcripts.
    pub transcripts: Option<&'static str>,
    /// Whether transcripts are folded into the deputy table.
    pub fold_transcripts: bool,
}

pub const LEGISLATURES: &[Legislature] = &[
    Legislature {
        term: 14,
        votes: VoteLayout::SingleFile("vote/14/Scrutins_XIV.json"),
        reunions: None,
        transcripts: None,
        fold_transcripts: false,
    },
    Legislature {
        term: 15,
        votes: VoteLayout::Folder("vote/15"),
        reunions: None,
        transcripts: None,
        fold_transcripts: false,
    },
    Legislature {
        term: 16,
        votes: VoteLayout::Folder("vote/16"),
        reunions: Some("reunion/16"),
        transcripts: Some("cr/16"),
        fold_transcripts: false,
    },
    Legislature {
        term: 17,
        votes: VoteLayout::Folder("vote/17"),
        reunions: Some("reunion/17"),
        transcripts: Some("cr/17"),
        fold_transcripts: true,
    },
];

/// Biography store layout.
pub const ACTOR_DIR: &str = "all_actors/acteur";
pub const ORGAN_DIR: &str = "all_actors/organe";

/// Cache directory for session documents referenced by votes.
pub const SESSION_DIR: &str = "seance";

/// Transcript references start with this; other reference kinds share the field.
pub const TRANSCRIPT_PREFIX: &str = "CRSAN";
/// Session references found on votes.
pub const SESSION_PREFIX: &str = "RUANR";

impl Legislature {
    pub fn find(term: u8) -> Option<&'static Legislature> {
        LEGISLATURES.iter().find(|l| l.term == term)
    }

    pub fn vote_output(&self) -> String {
        format!("processed/vote_{}.json", self.term)
    }

    pub fn deputy_output(&self) -> String {
        format!("processed/deputees_{}.json", self.term)
    }

    pub fn session_cache(&self) -> String {
        format!("{SESSION_DIR}/{}", self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_unique_and_ordered() {
        let terms: Vec<u8> = LEGISLATURES.iter().map(|l| l.term).collect();
        assert_eq!(terms, vec![14, 15, 16, 17]);
    }

    #[test]
    fn only_oldest_term_uses_single_file() {
        for leg in LEGISLATURES {
            let single = matches!(leg.votes, VoteLayout::SingleFile(_));
            assert_eq!(single, leg.term == 14, "term {}", leg.term);
        }
    }

    #[test]
    fn folded_transcripts_have_a_cache_dir() {
        for leg in LEGISLATURES.iter().filter(|l| l.fold_transcripts) {
            assert!(leg.transcripts.is_some());
        }
    }

    #[test]
    fn output_paths() {
        let leg = Legislature::find(17).unwrap();
        assert_eq!(leg.vote_output(), "processed/vote_17.json");
        assert_eq!(leg.deputy_output(), "processed/deputees_17.json");
        assert_eq!(leg.session_cache(), "seance/17");
        assert!(Legislature::find(3).is_none());
    }
}
