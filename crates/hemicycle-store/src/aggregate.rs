//! Per-term aggregation: enumerate vote (and transcript) documents, normalize
//! each one, merge into a keyed mapping.
//!
//! A document that cannot be read or normalized is logged, recorded in the
//! [`BatchReport`] and left out. Nothing here aborts a batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hemicycle_core::vote::parse_scrutin;
use hemicycle_core::{
    BatchReport, Biography, DeputyRecord, DeputyTable, Shape, SkipReason, VoteLayout, VoteRecord,
    normalize_vote, shape,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::StoreError;
use crate::files::{display_name, json_files, read_json, write_json_pretty};

/// Where one term's vote documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteSource {
    /// One vote per `*.json` file.
    Folder(PathBuf),
    /// One file listing every vote under `scrutins.scrutin`.
    SingleFile(PathBuf),
}

impl VoteSource {
    pub fn resolve(data_dir: &Path, layout: VoteLayout) -> Self {
        match layout {
            VoteLayout::Folder(rel) => VoteSource::Folder(data_dir.join(rel)),
            VoteLayout::SingleFile(rel) => VoteSource::SingleFile(data_dir.join(rel)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            VoteSource::Folder(p) | VoteSource::SingleFile(p) => p,
        }
    }

    /// Hand every vote document to `visit` with a label naming its origin.
    ///
    /// Only enumeration differs between the two layouts; each document is
    /// passed on as-is.
    pub fn for_each_document(
        &self,
        report: &mut BatchReport,
        mut visit: impl FnMut(&str, &Value, &mut BatchReport),
    ) {
        match self {
            VoteSource::Folder(dir) => {
                for_each_file(dir, report, |name, doc, report| visit(name, &doc, report))
            }
            VoteSource::SingleFile(path) => {
                let name = display_name(path);
                let doc = match read_json(path) {
                    Ok(doc) => doc,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "could not read vote file");
                        report.skip(name, SkipReason::malformed(e.to_string()));
                        return;
                    }
                };
                let Some(scrutins) = shape::object_at(&doc, &["scrutins"]) else {
                    warn!(file = %path.display(), "no `scrutins` collection");
                    report.skip(name, SkipReason::MissingKey { key: "scrutins" });
                    return;
                };
                let items = Shape::of(scrutins.get("scrutin")).into_list();
                info!(file = %path.display(), count = items.len(), "processing consolidated vote file");
                for (idx, item) in items.into_iter().enumerate() {
                    report.processed += 1;
                    visit(&format!("{name}#{idx}"), item, report);
                }
            }
        }
    }
}

fn for_each_file(
    dir: &Path,
    report: &mut BatchReport,
    mut visit: impl FnMut(&str, Value, &mut BatchReport),
) {
    let files = match json_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list directory");
            return;
        }
    };
    info!(dir = %dir.display(), count = files.len(), "processing folder");
    for path in files {
        let name = display_name(&path);
        match read_json(&path) {
            Ok(doc) => {
                report.processed += 1;
                visit(&name, doc, report);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not process file");
                report.skip(name, SkipReason::malformed(e.to_string()));
            }
        }
    }
}

/// Every vote of a term, keyed by vote id.
pub fn aggregate_votes(source: &VoteSource) -> (BTreeMap<String, VoteRecord>, BatchReport) {
    let mut report = BatchReport::new();
    let mut votes = BTreeMap::new();

    source.for_each_document(&mut report, |name, doc, report| match normalize_vote(doc) {
        Ok(vote) => {
            if votes.contains_key(&vote.id) {
                warn!(vote = %vote.id, source = name, "duplicate vote id, keeping the later one");
            }
            votes.insert(vote.id.clone(), vote);
        }
        Err(reason) => {
            warn!(source = name, %reason, "vote skipped");
            report.skip(name, reason);
        }
    });

    report.records = votes.len();
    info!(count = votes.len(), skipped = report.skipped.len(), "votes aggregated");
    (votes, report)
}

/// Every deputy seen in a term's votes and, when given, its transcripts.
pub fn aggregate_deputies<B: Biography + ?Sized>(
    source: &VoteSource,
    transcripts: Option<&Path>,
    bio: &B,
) -> (BTreeMap<String, DeputyRecord>, BatchReport) {
    let mut report = BatchReport::new();
    let mut table = DeputyTable::new();

    source.for_each_document(&mut report, |_, doc, _| {
        table.fold_vote(&parse_scrutin(doc), bio);
    });

    if let Some(dir) = transcripts {
        if dir.is_dir() {
            let mut appended = 0;
            for_each_file(dir, &mut report, |_, doc, _| {
                appended += table.fold_transcript(&doc, bio);
            });
            info!(dir = %dir.display(), speeches = appended, "transcripts folded");
        } else {
            info!(dir = %dir.display(), "no transcript directory, skipping speeches");
        }
    }

    let (deputies, unresolved) = table.finish();
    for id in unresolved.actors {
        report.skip("biography", SkipReason::UnknownActor { id });
    }
    for id in unresolved.organs {
        report.skip("biography", SkipReason::UnknownOrgan { id });
    }

    report.records = deputies.len();
    info!(count = deputies.len(), skipped = report.skipped.len(), "deputies aggregated");
    (deputies, report)
}

/// Write a term artifact. An empty mapping writes nothing and leaves any
/// previous artifact in place; returns whether a file was written.
pub fn write_artifact<T: Serialize>(
    path: &Path,
    records: &BTreeMap<String, T>,
) -> Result<bool, StoreError> {
    if records.is_empty() {
        warn!(file = %path.display(), "nothing aggregated, output not written");
        return Ok(false);
    }
    write_json_pretty(path, records)?;
    info!(file = %path.display(), count = records.len(), "artifact written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DirBiography;
    use serde_json::json;
    use std::fs;

    fn scrutin(uid: &str, date: &str, organ: &str, actor: &str) -> Value {
        json!({
            "uid": uid,
            "dateScrutin": date,
            "typeVote": { "codeTypeVote": "SPO" },
            "ventilationVotes": { "organe": { "groupes": { "groupe": {
                "organeRef": organ,
                "vote": { "decompteNominatif": {
                    "pours": { "votant": { "acteurRef": actor, "numPlace": "42" } }
                } }
            } } } }
        })
    }

    fn write(path: &Path, body: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    fn seed_biography(data: &Path) {
        write(
            &data.join("all_actors/acteur/PA1.json"),
            &json!({ "acteur": { "etatCivil": { "ident": { "nom": "Dupont", "prenom": "Marie" } } } })
                .to_string(),
        );
        write(
            &data.join("all_actors/acteur/PA9999.json"),
            &json!({ "acteur": { "etatCivil": { "ident": { "nom": "Orateur", "prenom": "Jean" } } } })
                .to_string(),
        );
        write(
            &data.join("all_actors/organe/PO1.json"),
            &json!({ "organe": { "libelle": "Groupe Un", "libelleAbrege": "G1" } }).to_string(),
        );
    }

    #[test]
    fn invalid_file_does_not_stop_the_batch() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("vote/17");
        write(
            &dir.join("VTANR5L17V1.json"),
            &json!({ "scrutin": scrutin("VTANR5L17V1", "2024-10-01", "PO1", "PA1") }).to_string(),
        );
        write(&dir.join("VTANR5L17V2.json"), "{ \"scrutin\": ");

        let (votes, report) = aggregate_votes(&VoteSource::Folder(dir));
        assert_eq!(votes.len(), 1);
        assert!(votes.contains_key("VTANR5L17V1"));
        assert_eq!(report.processed, 1);
        assert_eq!(report.records, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source, "VTANR5L17V2.json");
        assert_eq!(report.skipped[0].reason.kind(), "malformed");
    }

    #[test]
    fn vote_without_uid_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("vote");
        write(&dir.join("a.json"), &json!({ "scrutin": { "dateScrutin": "2024-01-01" } }).to_string());

        let (votes, report) = aggregate_votes(&VoteSource::Folder(dir));
        assert!(votes.is_empty());
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::MissingKey { key: "uid" }
        );
    }

    #[test]
    fn folder_and_single_file_converge() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = scrutin("V1", "2012-07-01", "PO1", "PA1");
        let b = scrutin("V2", "2012-07-02", "PO1", "PA2");

        let dir = tmp.path().join("folder");
        write(&dir.join("V1.json"), &json!({ "scrutin": a }).to_string());
        write(&dir.join("V2.json"), &json!({ "scrutin": b }).to_string());

        let single = tmp.path().join("Scrutins_XIV.json");
        write(&single, &json!({ "scrutins": { "scrutin": [a, b] } }).to_string());

        let (from_folder, _) = aggregate_votes(&VoteSource::Folder(dir));
        let (from_single, report) = aggregate_votes(&VoteSource::SingleFile(single));
        assert_eq!(from_folder, from_single);
        assert_eq!(from_single.len(), 2);
        assert_eq!(report.processed, 2);
    }

    #[test]
    fn single_file_with_one_scrutin_object() {
        let tmp = tempfile::TempDir::new().unwrap();
        let single = tmp.path().join("one.json");
        write(
            &single,
            &json!({ "scrutins": { "scrutin": scrutin("V1", "2012-07-01", "PO1", "PA1") } }).to_string(),
        );
        let (votes, _) = aggregate_votes(&VoteSource::SingleFile(single));
        assert_eq!(votes["V1"].votes_for, vec!["PA1"]);
    }

    #[test]
    fn single_file_without_collection_is_skipped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let single = tmp.path().join("wrong.json");
        write(&single, "{\"other\": []}");
        let (votes, report) = aggregate_votes(&VoteSource::SingleFile(single));
        assert!(votes.is_empty());
        assert_eq!(report.skipped[0].reason.kind(), "missing-key");
    }

    #[test]
    fn missing_source_yields_empty_mapping() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (votes, report) = aggregate_votes(&VoteSource::Folder(tmp.path().join("nope")));
        assert!(votes.is_empty());
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn empty_result_leaves_previous_artifact() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("processed/vote_17.json");
        write(&out, "{\"keep\": true}");

        let empty: BTreeMap<String, VoteRecord> = BTreeMap::new();
        assert!(!write_artifact(&out, &empty).unwrap());
        assert_eq!(fs::read_to_string(&out).unwrap(), "{\"keep\": true}");
    }

    #[test]
    fn artifact_overwrites_wholesale() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("vote");
        write(
            &dir.join("V1.json"),
            &json!({ "scrutin": scrutin("V1", "2024-01-01", "PO1", "PA1") }).to_string(),
        );
        let out = tmp.path().join("processed/vote.json");
        write(&out, "{\"stale\": {}}");

        let (votes, _) = aggregate_votes(&VoteSource::Folder(dir));
        assert!(write_artifact(&out, &votes).unwrap());

        let written = read_json(&out).unwrap();
        assert!(written.get("stale").is_none());
        assert_eq!(written["V1"]["votes_for"][0], "PA1");
        assert_eq!(written["V1"]["votes_abs"], json!([]));
    }

    #[test]
    fn deputies_from_votes_and_transcripts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data = tmp.path();
        seed_biography(data);

        let votes = data.join("vote/17");
        write(
            &votes.join("V1.json"),
            &json!({ "scrutin": scrutin("V1", "2024-10-01", "PO1", "PA1") }).to_string(),
        );
        write(
            &votes.join("V2.json"),
            &json!({ "scrutin": scrutin("V2", "2024-10-02", "PO1", "PA_UNKNOWN") }).to_string(),
        );

        let cr = data.join("cr/17");
        write(
            &cr.join("CRSANR5L17S2024O1N001.json"),
            &json!({ "contenu": { "point": { "paragraphe": {
                "orateurs": { "orateur": { "id": "9999" } }, "texte": "Bonjour"
            } } } })
            .to_string(),
        );
        write(&cr.join("broken.json"), "not json");

        let bio = DirBiography::under(data);
        let (deputies, report) =
            aggregate_deputies(&VoteSource::Folder(votes), Some(cr.as_path()), &bio);

        assert_eq!(deputies.len(), 2);
        let marie = &deputies["PA1"];
        assert_eq!(marie.name, "Dupont Marie");
        assert_eq!(marie.chair_numbers, vec![42]);
        assert_eq!(marie.organ.as_ref().unwrap().name_short.as_deref(), Some("G1"));
        assert_eq!(deputies["PA9999"].speeches, vec!["Bonjour"]);

        let counts = report.counts_by_kind();
        assert_eq!(counts["unknown-actor"], 1);
        assert_eq!(counts["malformed"], 1);
        assert_eq!(report.records, 2);
    }

    #[test]
    fn missing_transcript_dir_is_not_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        seed_biography(tmp.path());
        let votes = tmp.path().join("vote");
        write(
            &votes.join("V1.json"),
            &json!({ "scrutin": scrutin("V1", "2024-10-01", "PO1", "PA1") }).to_string(),
        );
        let bio = DirBiography::under(tmp.path());
        let absent = tmp.path().join("cr/none");
        let (deputies, report) =
            aggregate_deputies(&VoteSource::Folder(votes), Some(absent.as_path()), &bio);
        assert_eq!(deputies.len(), 1);
        assert!(report.is_clean());
    }
}
