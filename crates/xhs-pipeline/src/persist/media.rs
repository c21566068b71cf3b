//! Media download sink: covers, videos, and gallery images per record.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use xhs_core::{AppConfig, NoteRecord, NoteType, ProxyConfig, SaveMode};

use super::{path_component, PersistError};

/// One file to fetch for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
    pub file_name: String,
}

impl Asset {
    fn new(url: &str, file_name: impl Into<String>) -> Self {
        Self {
            url: url.to_owned(),
            file_name: file_name.into(),
        }
    }
}

/// Asset counts for one media sink run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaSummary {
    /// Records that had at least one asset to fetch.
    pub records: usize,
    pub attempted: usize,
    pub downloaded: usize,
    pub failed: usize,
}

/// Assets `mode` selects for `record`: cover and video for video posts,
/// every gallery image for normal posts.
#[must_use]
pub fn plan_assets(record: &NoteRecord, mode: SaveMode) -> Vec<Asset> {
    match record.note_type {
        NoteType::Video if mode.downloads_video() => {
            let mut assets = Vec::with_capacity(2);
            if let Some(cover) = record.video_cover.as_deref().filter(|s| !s.is_empty()) {
                assets.push(Asset::new(cover, "cover.jpg"));
            }
            if let Some(video) = record.video_addr.as_deref().filter(|s| !s.is_empty()) {
                assets.push(Asset::new(video, "video.mp4"));
            }
            assets
        }
        NoteType::Normal if mode.downloads_images() => record
            .image_list
            .iter()
            .enumerate()
            .map(|(idx, url)| Asset::new(url, format!("image_{}.jpg", idx + 1)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Fetches media files with bounded concurrency.
pub struct MediaDownloader {
    client: Client,
    concurrency: usize,
}

impl MediaDownloader {
    /// # Errors
    ///
    /// Returns [`PersistError::Http`] if the proxy is rejected or the HTTP
    /// client cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
        concurrency: usize,
    ) -> Result<Self, PersistError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent);
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.url())?);
        }
        Ok(Self {
            client: builder.build()?,
            concurrency: concurrency.max(1),
        })
    }

    /// # Errors
    ///
    /// See [`MediaDownloader::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PersistError> {
        // Videos are large; allow well beyond the API timeout.
        let timeout_secs = config.request_timeout_secs.saturating_mul(10);
        Self::new(
            timeout_secs,
            &config.user_agent,
            config.proxy.as_ref(),
            config.media_concurrency,
        )
    }

    /// Downloads every selected asset into `<media_dir>/<note_id>/`, next to
    /// an `info.json` with the record.
    ///
    /// Individual asset failures are logged and counted. The sink as a whole
    /// fails only when assets were attempted and none arrived.
    pub(super) async fn download_all(
        &self,
        records: &[NoteRecord],
        mode: SaveMode,
        media_dir: &Path,
    ) -> (MediaSummary, Result<(), PersistError>) {
        let mut summary = MediaSummary::default();
        let mut jobs: Vec<(String, PathBuf)> = Vec::new();
        let mut planned_dirs: HashSet<PathBuf> = HashSet::new();

        for record in records {
            let assets = plan_assets(record, mode);
            if assets.is_empty() {
                continue;
            }

            // One writer per destination file.
            let dir = media_dir.join(path_component(&record.note_id));
            if !planned_dirs.insert(dir.clone()) {
                tracing::debug!(note_id = %record.note_id, "media already planned for this note");
                continue;
            }
            summary.records += 1;
            summary.attempted += assets.len();

            if let Err(e) = prepare_record_dir(&dir, record).await {
                tracing::warn!(note_id = %record.note_id, error = %e, "skipping media for record");
                summary.failed += assets.len();
                continue;
            }
            jobs.extend(
                assets
                    .into_iter()
                    .map(|asset| (asset.url, dir.join(asset.file_name))),
            );
        }

        let outcomes: Vec<bool> = stream::iter(jobs)
            .map(|(url, dest)| async move {
                match self.download(&url, &dest).await {
                    Ok(bytes) => {
                        tracing::debug!(url = %url, path = %dest.display(), bytes, "asset saved");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "asset download failed");
                        false
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for ok in outcomes {
            if ok {
                summary.downloaded += 1;
            } else {
                summary.failed += 1;
            }
        }

        let result = if summary.attempted > 0 && summary.downloaded == 0 {
            Err(PersistError::MediaUnavailable {
                attempted: summary.attempted,
            })
        } else {
            Ok(())
        };
        (summary, result)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, PersistError> {
        let failed = |reason: String| PersistError::Download {
            url: url.to_owned(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status.as_u16())));
        }

        let written = stream_to_file(response, dest).await;
        if written.is_err() {
            // Never leave a truncated file behind.
            let _ = tokio::fs::remove_file(dest).await;
        }
        written.map_err(|e| match e {
            StreamError::Http(e) => failed(e.to_string()),
            StreamError::Io(source) => PersistError::Io {
                path: dest.to_path_buf(),
                source,
            },
        })
    }
}

enum StreamError {
    Http(reqwest::Error),
    Io(std::io::Error),
}

async fn stream_to_file(response: reqwest::Response, dest: &Path) -> Result<u64, StreamError> {
    let mut file = tokio::fs::File::create(dest).await.map_err(StreamError::Io)?;
    let mut body = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(StreamError::Http)?;
        file.write_all(&chunk).await.map_err(StreamError::Io)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(StreamError::Io)?;
    Ok(written)
}

async fn prepare_record_dir(dir: &Path, record: &NoteRecord) -> Result<(), PersistError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(PersistError::io(dir))?;
    let info_path = dir.join("info.json");
    let body = serde_json::to_vec_pretty(record)?;
    tokio::fs::write(&info_path, body)
        .await
        .map_err(PersistError::io(&info_path))
}
