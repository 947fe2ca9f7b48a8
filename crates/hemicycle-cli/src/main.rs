mod display;
mod jobs;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use hemicycle_store::DirBiography;
use tracing_subscriber::EnvFilter;

/// Extract votes, deputies and speeches from the Assemblée nationale open data.
#[derive(Parser, Debug)]
#[command(name = "hemicycle", version, about)]
struct Cli {
    /// Root of the raw and processed data tree.
    #[arg(long, env = "HEMICYCLE_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Restrict the run to these legislative terms (repeatable). Default: all.
    #[arg(long = "term", global = true)]
    terms: Vec<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the transcripts referenced by each term's sessions.
    FetchTranscripts(FetchArgs),
    /// Download the plenary sessions referenced by each term's votes.
    FetchSessions(FetchArgs),
    /// Build `processed/vote_<term>.json`.
    Votes,
    /// Build `processed/deputees_<term>.json`.
    Deputies,
    /// Votes, then deputies.
    All,
}

#[derive(Args, Debug, Clone)]
struct FetchArgs {
    /// Pause between consecutive requests.
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Per-request timeout.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Fetch transcripts as XML instead of JSON.
    #[arg(long)]
    xml: bool,
}

impl FetchArgs {
    fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("hemicycle v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let terms = jobs::select_terms(&cli.terms)?;
    let data = cli.data_dir.as_path();

    for leg in terms {
        display::print_term_banner(leg.term);
        let outcome = match &cli.command {
            Command::FetchTranscripts(args) => jobs::fetch_transcripts(data, leg, args),
            Command::FetchSessions(args) => jobs::fetch_sessions(data, leg, args),
            Command::Votes => jobs::run_votes(data, leg),
            Command::Deputies => jobs::run_deputies(data, leg, &DirBiography::under(data)),
            Command::All => jobs::run_votes(data, leg)
                .and_then(|()| jobs::run_deputies(data, leg, &DirBiography::under(data))),
        };
        if let Err(e) = outcome {
            tracing::error!(term = leg.term, error = ?e, "term failed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["hemicycle", "votes"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert!(cli.terms.is_empty());
        assert!(matches!(cli.command, Command::Votes));
    }

    #[test]
    fn fetch_options_and_terms() {
        let cli = Cli::try_parse_from([
            "hemicycle",
            "fetch-transcripts",
            "--delay-ms",
            "500",
            "--xml",
            "--term",
            "16",
            "--term",
            "17",
        ])
        .unwrap();
        assert_eq!(cli.terms, vec![16, 17]);
        match cli.command {
            Command::FetchTranscripts(args) => {
                assert_eq!(args.delay(), Duration::from_millis(500));
                assert_eq!(args.timeout(), Duration::from_secs(30));
                assert!(args.xml);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["hemicycle"]).is_err());
    }
}
