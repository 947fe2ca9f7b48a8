//! Console summaries for batch runs.

use std::path::Path;

use hemicycle_core::BatchReport;
use hemicycle_sync::{FetchSummary, RefScan};

const MAX_EXAMPLES: usize = 10;

pub fn print_term_banner(term: u8) {
    println!();
    println!("=== Legislature {term} ===");
}

/// Records written, documents read, skips grouped by kind with a few examples.
pub fn print_report(title: &str, report: &BatchReport, output: &Path, written: bool) {
    println!("{title}");
    println!("  {:<12} {}", "documents", report.processed);
    println!("  {:<12} {}", "records", report.records);
    if written {
        println!("  {:<12} {}", "written", output.display());
    } else {
        println!("  {:<12} nothing written ({})", "output", output.display());
    }

    if report.is_clean() {
        println!();
        return;
    }
    for (kind, count) in report.counts_by_kind() {
        println!("  {:<12} {}", kind, count);
        let examples = report
            .skipped
            .iter()
            .filter(|s| s.reason.kind() == kind)
            .take(MAX_EXAMPLES);
        for skip in examples {
            println!("    {}: {}", skip.source, skip.reason);
        }
        if count > MAX_EXAMPLES {
            println!("    ... and {} more", count - MAX_EXAMPLES);
        }
    }
    println!();
}

pub fn print_fetch(title: &str, scan: &RefScan, summary: &FetchSummary) {
    println!("{title}");
    println!("  {:<12} {} ({} unreadable)", "scanned", scan.files, scan.skipped);
    println!("  {:<12} {}", "references", scan.refs.len());
    println!("  {:<12} {}", "downloaded", summary.downloaded);
    println!("  {:<12} {}", "cached", summary.cached);
    println!(
        "  {:<12} {} ({} not found)",
        "failed",
        summary.failed.len(),
        summary.not_found()
    );
    for (id, err) in summary.failed.iter().take(MAX_EXAMPLES) {
        println!("    {id}: {err}");
    }
    if summary.failed.len() > MAX_EXAMPLES {
        println!("    ... and {} more", summary.failed.len() - MAX_EXAMPLES);
    }
    println!();
}
