//! Persistence dispatcher: routes a batch's successful records to the sinks
//! selected by a [`SaveMode`].
//!
//! Sinks run independently. A sink that fails is logged and reported in the
//! [`PersistReport`]; it never stops the others and never surfaces as an
//! error to the caller.

mod media;
mod snapshot;
mod table;

use std::path::{Path, PathBuf};

use thiserror::Error;
use xhs_core::{AppConfig, NoteRecord, SaveMode, UserProfile};

pub use media::{plan_assets, Asset, MediaDownloader, MediaSummary};
pub use snapshot::Snapshot;

const EXPORTS_SUBDIR: &str = "excel_datas";
const MEDIA_SUBDIR: &str = "media_datas";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error writing {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("all {attempted} media downloads failed")]
    MediaUnavailable { attempted: usize },
}

impl PersistError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Snapshot,
    Table,
    Media,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Snapshot => write!(f, "snapshot"),
            SinkKind::Table => write!(f, "table"),
            SinkKind::Media => write!(f, "media"),
        }
    }
}

/// Result of one sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkOutcome {
    pub sink: SinkKind,
    /// File or directory the sink wrote to.
    pub location: PathBuf,
    /// Failure message; `None` on success.
    pub error: Option<String>,
}

impl SinkOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Single path component derived from untrusted text (note ids, nicknames).
///
/// Separators become `_`; blank or dot-only names become `unknown`.
pub(crate) fn path_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "unknown".to_owned()
    } else {
        cleaned
    }
}

/// What a [`Persister::persist`] call did, sink by sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub outcomes: Vec<SinkOutcome>,
    /// Per-asset counts when the media sink ran.
    pub media: Option<MediaSummary>,
}

impl PersistReport {
    /// `true` when every requested sink failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| !o.succeeded())
    }

    #[must_use]
    pub fn outcome(&self, sink: SinkKind) -> Option<&SinkOutcome> {
        self.outcomes.iter().find(|o| o.sink == sink)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    fn record(&mut self, sink: SinkKind, location: PathBuf, result: Result<(), PersistError>) {
        let error = match result {
            Ok(()) => {
                tracing::info!(sink = %sink, path = %location.display(), "sink written");
                None
            }
            Err(e) => {
                tracing::error!(sink = %sink, path = %location.display(), error = %e, "sink failed");
                Some(e.to_string())
            }
        };
        self.outcomes.push(SinkOutcome {
            sink,
            location,
            error,
        });
    }
}

/// Writes batch output below one root directory:
/// `<root>/excel_datas/<name>.{json,xlsx}` and `<root>/media_datas/<note_id>/`.
pub struct Persister {
    exports_dir: PathBuf,
    media_dir: PathBuf,
    media: MediaDownloader,
}

impl Persister {
    #[must_use]
    pub fn new(output_dir: &Path, media: MediaDownloader) -> Self {
        Self {
            exports_dir: output_dir.join(EXPORTS_SUBDIR),
            media_dir: output_dir.join(MEDIA_SUBDIR),
            media,
        }
    }

    /// Builds a persister rooted at `config.output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Http`] if the media HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PersistError> {
        let media = MediaDownloader::from_config(config)?;
        Ok(Self::new(&config.output_dir, media))
    }

    #[must_use]
    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Creates the output directories `mode` needs. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if a directory cannot be created.
    pub async fn ensure_ready(&self, mode: SaveMode) -> Result<(), PersistError> {
        tokio::fs::create_dir_all(&self.exports_dir)
            .await
            .map_err(PersistError::io(&self.exports_dir))?;
        if mode.downloads_media() {
            tokio::fs::create_dir_all(&self.media_dir)
                .await
                .map_err(PersistError::io(&self.media_dir))?;
        }
        Ok(())
    }

    /// Runs every sink `mode` selects, then the snapshot, which always runs.
    pub async fn persist(
        &self,
        records: &[NoteRecord],
        mode: SaveMode,
        output_name: &str,
        profile: Option<&UserProfile>,
    ) -> PersistReport {
        let mut report = PersistReport::default();
        let output_name = path_component(output_name);

        if let Err(e) = self.ensure_ready(mode).await {
            // Each sink will report its own failure below.
            tracing::warn!(error = %e, "could not prepare output directories");
        }

        if mode.downloads_media() {
            let (summary, result) = self.media.download_all(records, mode, &self.media_dir).await;
            report.media = Some(summary);
            report.record(SinkKind::Media, self.media_dir.clone(), result);
        }

        if mode.writes_table() {
            let path = self.exports_dir.join(format!("{output_name}.xlsx"));
            let result = table::write_table(&path, records);
            report.record(SinkKind::Table, path, result);
        }

        let path = self.exports_dir.join(format!("{output_name}.json"));
        let result = snapshot::write_snapshot(&path, profile, records).await;
        report.record(SinkKind::Snapshot, path, result);

        if report.all_failed() {
            tracing::warn!(output_name = %output_name, "every requested sink failed; nothing was persisted");
        }
        report
    }
}
