//! Per-term batch jobs.

use std::path::Path;

use anyhow::{Context, bail};
use hemicycle_core::{Biography, LEGISLATURES, Legislature};
use hemicycle_store::{VoteSource, aggregate_deputies, aggregate_votes, write_artifact};
use hemicycle_sync::{Fetcher, RefRule, collect_refs, fetch_all};
use tracing::info;

use crate::FetchArgs;
use crate::display;

/// Legislatures to run, in table order. An empty filter selects all.
pub fn select_terms(terms: &[u8]) -> anyhow::Result<Vec<&'static Legislature>> {
    if let Some(unknown) = terms.iter().find(|t| Legislature::find(**t).is_none()) {
        let known: Vec<String> = LEGISLATURES.iter().map(|l| l.term.to_string()).collect();
        bail!("unknown legislature {unknown} (known: {})", known.join(", "));
    }
    Ok(LEGISLATURES
        .iter()
        .filter(|l| terms.is_empty() || terms.contains(&l.term))
        .collect())
}

pub fn fetch_transcripts(data: &Path, leg: &Legislature, args: &FetchArgs) -> anyhow::Result<()> {
    let (Some(reunions), Some(transcripts)) = (leg.reunions, leg.transcripts) else {
        info!(term = leg.term, "no session documents for this term");
        return Ok(());
    };
    let scan = collect_refs(&data.join(reunions), &RefRule::TRANSCRIPTS);
    if scan.refs.is_empty() {
        info!(term = leg.term, "no transcript references found");
        return Ok(());
    }

    let out = data.join(transcripts);
    let fetcher = if args.xml {
        Fetcher::xml(&out, args.timeout())
    } else {
        Fetcher::json(&out, args.timeout())
    }
    .context("building HTTP client")?;

    let summary = fetch_all(&fetcher, &scan.refs, args.delay());
    display::print_fetch("Transcripts", &scan, &summary);
    Ok(())
}

pub fn fetch_sessions(data: &Path, leg: &Legislature, args: &FetchArgs) -> anyhow::Result<()> {
    let VoteSource::Folder(votes) = VoteSource::resolve(data, leg.votes) else {
        info!(term = leg.term, "consolidated vote file, session references not collected");
        return Ok(());
    };
    let scan = collect_refs(&votes, &RefRule::SESSIONS);
    if scan.refs.is_empty() {
        info!(term = leg.term, "no session references found");
        return Ok(());
    }

    let fetcher =
        Fetcher::json(data.join(leg.session_cache()), args.timeout()).context("building HTTP client")?;
    let summary = fetch_all(&fetcher, &scan.refs, args.delay());
    display::print_fetch("Sessions", &scan, &summary);
    Ok(())
}

pub fn run_votes(data: &Path, leg: &Legislature) -> anyhow::Result<()> {
    let source = VoteSource::resolve(data, leg.votes);
    let (votes, report) = aggregate_votes(&source);

    let output = data.join(leg.vote_output());
    let written = write_artifact(&output, &votes)
        .with_context(|| format!("writing {}", output.display()))?;
    display::print_report("Votes", &report, &output, written);
    Ok(())
}

pub fn run_deputies<B: Biography + ?Sized>(
    data: &Path,
    leg: &Legislature,
    bio: &B,
) -> anyhow::Result<()> {
    let source = VoteSource::resolve(data, leg.votes);
    let transcripts = leg
        .transcripts
        .filter(|_| leg.fold_transcripts)
        .map(|rel| data.join(rel));
    let (deputies, report) = aggregate_deputies(&source, transcripts.as_deref(), bio);

    let output = data.join(leg.deputy_output());
    let written = write_artifact(&output, &deputies)
        .with_context(|| format!("writing {}", output.display()))?;
    display::print_report("Deputies", &report, &output, written);
    Ok(())
}
