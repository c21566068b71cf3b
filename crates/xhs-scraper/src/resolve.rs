//! Detail resolution: one post target in, one normalized record out.

use reqwest::Url;
use xhs_core::{Credential, ItemError, NoteRecord, NoteSummary};

use crate::normalize::normalize_note;
use crate::source::NoteSource;

/// What to resolve: a ready-made post URL or a listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailTarget {
    Url(String),
    Summary(NoteSummary),
}

impl DetailTarget {
    /// The URL the detail request will be made for, or `None` when a summary
    /// has no usable note id.
    #[must_use]
    pub fn note_url(&self, web_base_url: &str) -> Option<String> {
        match self {
            Self::Url(url) => Some(url.clone()),
            Self::Summary(summary) => note_url_for(summary, web_base_url),
        }
    }
}

/// Canonical post URL for a listing entry:
/// `<web_base>/explore/<note_id>`, plus `xsec_token` and the user source
/// tag when the entry carries a token.
#[must_use]
pub fn note_url_for(summary: &NoteSummary, web_base_url: &str) -> Option<String> {
    let note_id = summary.usable_id()?;
    let base = format!("{}/explore/{note_id}", web_base_url.trim_end_matches('/'));
    if summary.xsec_token.is_empty() {
        return Some(base);
    }

    match Url::parse(&base) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("xsec_token", &summary.xsec_token)
                .append_pair("xsec_source", "pc_user");
            Some(url.to_string())
        }
        Err(_) => Some(format!(
            "{base}?xsec_token={}&xsec_source=pc_user",
            summary.xsec_token
        )),
    }
}

/// Fetches and normalizes one post.
///
/// # Errors
///
/// - [`ItemError::MissingIdentifier`] if a summary target has no usable id.
/// - [`ItemError::FetchFailed`] if the upstream call fails.
/// - [`ItemError::MalformedResponse`] if the response lacks `data.items`.
/// - [`ItemError::NotFound`] if `data.items` is empty.
pub async fn resolve_detail<S>(
    source: &S,
    target: &DetailTarget,
    credential: &Credential,
) -> Result<NoteRecord, ItemError>
where
    S: NoteSource + ?Sized,
{
    let note_url = target
        .note_url(source.web_base_url())
        .ok_or(ItemError::MissingIdentifier)?;

    let response = source
        .fetch_note_detail(&note_url, credential)
        .await
        .map_err(|e| {
            tracing::debug!(url = %note_url, error = %e, "note detail fetch failed");
            ItemError::from(e)
        })?;

    let items = response
        .data
        .and_then(|d| d.items)
        .ok_or_else(|| ItemError::MalformedResponse {
            detail: "response has no data.items container".to_owned(),
        })?;

    let first = items.first().ok_or(ItemError::NotFound)?;
    Ok(normalize_note(first, &note_url))
}
