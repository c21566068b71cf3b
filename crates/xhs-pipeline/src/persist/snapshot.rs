use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use xhs_core::{NoteRecord, UserProfile};

use super::PersistError;

/// JSON document written for every persisted batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<&'a UserProfile>,
    pub count: usize,
    pub records: &'a [NoteRecord],
    pub generated_at: DateTime<Utc>,
}

impl<'a> Snapshot<'a> {
    #[must_use]
    pub fn new(profile: Option<&'a UserProfile>, records: &'a [NoteRecord]) -> Self {
        Self {
            user_profile: profile,
            count: records.len(),
            records,
            generated_at: Utc::now(),
        }
    }
}

pub(super) async fn write_snapshot(
    path: &Path,
    profile: Option<&UserProfile>,
    records: &[NoteRecord],
) -> Result<(), PersistError> {
    let body = serde_json::to_vec_pretty(&Snapshot::new(profile, records))?;
    tokio::fs::write(path, body)
        .await
        .map_err(PersistError::io(path))
}
