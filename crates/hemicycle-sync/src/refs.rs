//! Cross-reference collection: which documents a directory points at.

use std::collections::BTreeSet;
use std::path::Path;

use hemicycle_core::legislature::{SESSION_PREFIX, TRANSCRIPT_PREFIX};
use hemicycle_core::{Shape, shape};
use hemicycle_store::files::{display_name, json_files, read_json};
use tracing::{info, warn};

/// Field to read and the identifier prefix to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefRule {
    pub path: &'static [&'static str],
    pub prefix: &'static str,
}

impl RefRule {
    /// Session → transcript references. The same field also carries
    /// committee report ids, which are filtered out by prefix.
    pub const TRANSCRIPTS: RefRule = RefRule {
        path: &["reunion", "compteRenduRef"],
        prefix: TRANSCRIPT_PREFIX,
    };

    /// Vote → plenary session references.
    pub const SESSIONS: RefRule = RefRule {
        path: &["scrutin", "seanceRef"],
        prefix: SESSION_PREFIX,
    };
}

/// Result of scanning one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefScan {
    pub refs: BTreeSet<String>,
    pub files: usize,
    pub skipped: usize,
}

/// Distinct identifiers under `rule.path` starting with `rule.prefix`.
///
/// Unreadable files are logged and skipped. A missing directory is an empty
/// scan.
pub fn collect_refs(dir: &Path, rule: &RefRule) -> RefScan {
    let mut scan = RefScan::default();
    let files = match json_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot scan for references");
            return scan;
        }
    };

    for path in files {
        scan.files += 1;
        let doc = match read_json(&path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file = %display_name(&path), error = %e, "error processing file");
                scan.skipped += 1;
                continue;
            }
        };
        let found = Shape::of(shape::path(&doc, rule.path))
            .into_list()
            .into_iter()
            .filter_map(|v| shape::text(Some(v)))
            .map(|id| id.trim().to_string())
            .filter(|id| id.starts_with(rule.prefix));
        scan.refs.extend(found);
    }

    info!(
        dir = %dir.display(),
        refs = scan.refs.len(),
        files = scan.files,
        skipped = scan.skipped,
        "references collected"
    );
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn reunion(dir: &Path, name: &str, cr: serde_json::Value) {
        fs::write(
            dir.join(name),
            json!({ "reunion": { "uid": name, "compteRenduRef": cr } }).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn keeps_distinct_prefixed_refs() {
        let tmp = tempfile::TempDir::new().unwrap();
        reunion(tmp.path(), "r1.json", json!("CRSANR5L17S2024O1N001"));
        reunion(tmp.path(), "r2.json", json!("CRSANR5L17S2024O1N001"));
        reunion(tmp.path(), "r3.json", json!("CRCANR5L17S2024PO59048N001"));
        reunion(tmp.path(), "r4.json", json!(null));
        reunion(tmp.path(), "r5.json", json!(""));
        reunion(tmp.path(), "r6.json", json!("CRSANR5L17S2024O1N002"));

        let scan = collect_refs(tmp.path(), &RefRule::TRANSCRIPTS);
        let refs: Vec<&str> = scan.refs.iter().map(String::as_str).collect();
        assert_eq!(refs, vec!["CRSANR5L17S2024O1N001", "CRSANR5L17S2024O1N002"]);
        assert_eq!(scan.files, 6);
        assert_eq!(scan.skipped, 0);
    }

    #[test]
    fn malformed_files_are_skipped() {
        let tmp = tempfile::TempDir::new().unwrap();
        reunion(tmp.path(), "ok.json", json!("CRSANR5L17S2024O1N003"));
        fs::write(tmp.path().join("bad.json"), "{{{").unwrap();
        fs::write(tmp.path().join("shape.json"), "[1, 2]").unwrap();

        let scan = collect_refs(tmp.path(), &RefRule::TRANSCRIPTS);
        assert_eq!(scan.refs.len(), 1);
        assert_eq!(scan.skipped, 1);
        assert_eq!(scan.files, 3);
    }

    #[test]
    fn list_valued_reference_field() {
        let tmp = tempfile::TempDir::new().unwrap();
        reunion(
            tmp.path(),
            "r.json",
            json!(["CRSANR5L17S2024O1N010", null, "OTHER", "CRSANR5L17S2024O1N011"]),
        );
        let scan = collect_refs(tmp.path(), &RefRule::TRANSCRIPTS);
        assert_eq!(scan.refs.len(), 2);
    }

    #[test]
    fn session_refs_from_votes() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(
            tmp.path().join("v.json"),
            json!({ "scrutin": { "uid": "V1", "seanceRef": "RUANR5L17S2024IDS28367" } }).to_string(),
        )
        .unwrap();
        let scan = collect_refs(tmp.path(), &RefRule::SESSIONS);
        assert!(scan.refs.contains("RUANR5L17S2024IDS28367"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let scan = collect_refs(&tmp.path().join("absent"), &RefRule::TRANSCRIPTS);
        assert_eq!(scan, RefScan::default());
    }
}
