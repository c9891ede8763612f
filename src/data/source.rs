use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::loader::parse_snapshot;
use super::model::Snapshot;
use crate::error::{FetchError, Result};

// ---------------------------------------------------------------------------
// Snapshot sources
// ---------------------------------------------------------------------------

/// Something that can produce a fresh snapshot on demand.
pub trait SnapshotSource {
    /// Human-readable origin, shown in the UI.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Snapshot>;
}

/// The remote pre-match export, fetched over HTTP.
pub struct HttpSource {
    url: String,
    league_prefix: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, league_prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            league_prefix: league_prefix.into(),
            timeout,
        }
    }

    fn http_err(&self, source: reqwest::Error) -> FetchError {
        FetchError::Http {
            url: self.url.clone(),
            source,
        }
    }
}

impl SnapshotSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Snapshot> {
        log::info!("Fetching {}", self.url);
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.http_err(e))?;
        let body = client
            .get(&self.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| self.http_err(e))?;
        parse_snapshot(body.as_ref(), &self.league_prefix, &self.url)
    }
}

/// A local copy of the export (e.g. written by `generate_sample`).
pub struct FileSource {
    path: PathBuf,
    league_prefix: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, league_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            league_prefix: league_prefix.into(),
        }
    }
}

impl SnapshotSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Snapshot> {
        let file = std::fs::File::open(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_snapshot(file, &self.league_prefix, &self.describe())
    }
}

// ---------------------------------------------------------------------------
// Memoizing provider
// ---------------------------------------------------------------------------

/// Loads a snapshot once and hands out the same `Arc` until invalidated.
pub struct SnapshotProvider {
    source: Box<dyn SnapshotSource>,
    cached: Option<Arc<Snapshot>>,
}

impl SnapshotProvider {
    pub fn new(source: Box<dyn SnapshotSource>) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Current snapshot, fetching it if this cache epoch has none yet.
    /// A failed fetch leaves the cache empty.
    pub fn snapshot(&mut self) -> Result<Arc<Snapshot>> {
        if let Some(snap) = &self.cached {
            return Ok(Arc::clone(snap));
        }
        let snap = Arc::new(self.source.fetch()?);
        self.cached = Some(Arc::clone(&snap));
        Ok(snap)
    }

    /// The cached snapshot, without fetching.
    pub fn cached(&self) -> Option<Arc<Snapshot>> {
        self.cached.clone()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Put back a snapshot from an earlier epoch after a failed refresh.
    pub fn restore(&mut self, snapshot: Arc<Snapshot>) {
        self.cached = Some(snapshot);
    }

    /// Invalidate and fetch again.
    pub fn refresh(&mut self) -> Result<Arc<Snapshot>> {
        self.invalidate();
        self.snapshot()
    }
}
