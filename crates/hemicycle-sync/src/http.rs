//! HTTP fetcher for open-data documents, with a file cache keyed by identifier.
//!
//! Fetches are blocking and strictly sequential. A document already present in
//! the cache is never re-fetched; staleness is not tracked.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{info, warn};

/// Session, vote and transcript detail as JSON.
pub const JSON_URL_TEMPLATE: &str = "https://www.assemblee-nationale.fr/dyn/opendata/{id}.json";
/// Transcript detail as XML.
pub const XML_URL_TEMPLATE: &str = "https://www.assemblee-nationale.fr/dyn/opendata/{id}.xml";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{id} not found (404)")]
    NotFound { id: String },
    #[error("server returned {status} for {id}")]
    Status { id: String, status: u16 },
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid {ext} payload for {id}: {detail}")]
    Malformed {
        id: String,
        ext: &'static str,
        detail: String,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Xml,
}

impl PayloadFormat {
    pub fn ext(self) -> &'static str {
        match self {
            PayloadFormat::Json => "json",
            PayloadFormat::Xml => "xml",
        }
    }

    /// Cheap sanity check before a payload is cached.
    fn validate(self, body: &[u8]) -> Result<(), String> {
        match self {
            PayloadFormat::Json => serde_json::from_slice::<serde_json::Value>(body)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            PayloadFormat::Xml => {
                let text = std::str::from_utf8(body).map_err(|e| e.to_string())?;
                if text.trim_start_matches('\u{feff}').trim_start().starts_with('<') {
                    Ok(())
                } else {
                    Err("document does not start with '<'".into())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination already existed; nothing was requested.
    Cached(PathBuf),
    /// Payload fetched and written verbatim.
    Downloaded(Vec<u8>),
}

/// Fetches `{id}`-templated URLs into `<out_dir>/<id>.<ext>`.
pub struct Fetcher {
    client: Client,
    url_template: String,
    format: PayloadFormat,
    out_dir: PathBuf,
}

impl Fetcher {
    pub fn new(
        url_template: impl Into<String>,
        format: PayloadFormat,
        out_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hemicycle/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url_template: url_template.into(),
            format,
            out_dir: out_dir.into(),
        })
    }

    /// JSON documents from the open-data endpoint.
    pub fn json(out_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        Self::new(JSON_URL_TEMPLATE, PayloadFormat::Json, out_dir, timeout)
    }

    /// XML transcripts from the open-data endpoint.
    pub fn xml(out_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        Self::new(XML_URL_TEMPLATE, PayloadFormat::Xml, out_dir, timeout)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn url(&self, id: &str) -> String {
        self.url_template.replace("{id}", id)
    }

    pub fn destination(&self, id: &str) -> PathBuf {
        self.out_dir.join(format!("{id}.{}", self.format.ext()))
    }

    /// Fetch one document unless it is already cached.
    ///
    /// Nothing is written on failure; the payload goes to a `.part` file first
    /// and is renamed into place once complete.
    pub fn fetch(&self, id: &str) -> Result<FetchOutcome, FetchError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(self.malformed(id, "identifier is not a plain file stem"));
        }

        let dest = self.destination(id);
        if dest.exists() {
            info!(id, "already cached, skipping");
            return Ok(FetchOutcome::Cached(dest));
        }

        let url = self.url(id);
        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes()?.to_vec();
        self.format
            .validate(&body)
            .map_err(|detail| self.malformed(id, detail))?;

        fs::create_dir_all(&self.out_dir).map_err(|source| FetchError::Io {
            path: self.out_dir.clone(),
            source,
        })?;
        let part = dest.with_extension(format!("{}.part", self.format.ext()));
        fs::write(&part, &body)
            .and_then(|()| fs::rename(&part, &dest))
            .map_err(|source| {
                let _ = fs::remove_file(&part);
                FetchError::Io {
                    path: dest.clone(),
                    source,
                }
            })?;

        info!(id, bytes = body.len(), "downloaded");
        Ok(FetchOutcome::Downloaded(body))
    }

    fn malformed(&self, id: &str, detail: impl Into<String>) -> FetchError {
        FetchError::Malformed {
            id: id.to_string(),
            ext: self.format.ext(),
            detail: detail.into(),
        }
    }
}

/// Tally of one batch of fetches.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub cached: usize,
    pub failed: Vec<(String, FetchError)>,
}

impl FetchSummary {
    pub fn total(&self) -> usize {
        self.downloaded + self.cached + self.failed.len()
    }

    pub fn not_found(&self) -> usize {
        self.failed
            .iter()
            .filter(|(_, e)| matches!(e, FetchError::NotFound { .. }))
            .count()
    }
}

/// Fetch every identifier in order, sleeping `delay` between consecutive
/// requests. Failures are logged and tallied; the batch always completes.
pub fn fetch_all(fetcher: &Fetcher, ids: &BTreeSet<String>, delay: Duration) -> FetchSummary {
    let mut summary = FetchSummary::default();
    let total = ids.len();
    info!(total, dir = %fetcher.out_dir().display(), "fetching documents");

    for (i, id) in ids.iter().enumerate() {
        match fetcher.fetch(id) {
            Ok(FetchOutcome::Cached(_)) => summary.cached += 1,
            Ok(FetchOutcome::Downloaded(_)) => summary.downloaded += 1,
            Err(e) => {
                warn!(id = %id, position = i + 1, total, error = %e, "fetch failed");
                summary.failed.push((id.clone(), e));
            }
        }
        if i + 1 < total && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    info!(
        downloaded = summary.downloaded,
        cached = summary.cached,
        failed = summary.failed.len(),
        "fetch complete"
    );
    summary
}
