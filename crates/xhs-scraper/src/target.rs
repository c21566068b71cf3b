//! Parsing of post and user-profile URLs into request targets.

use reqwest::Url;
use xhs_core::PipelineError;

/// Source tag appended to user URLs that carry no query string.
pub const DEFAULT_USER_SOURCE_TAG: &str = "xsec_source=pc_user";

/// Source tag sent with detail requests when the URL names none.
pub const DEFAULT_NOTE_SOURCE: &str = "pc_feed";

/// Appends the default source tag when `url` has no query string.
///
/// Idempotent: a URL that already has a query (including one this function
/// produced) is returned unchanged. The tag goes before any fragment.
/// Unparseable input is returned as-is for the caller to reject.
#[must_use]
pub fn ensure_source_tag(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.query().is_none() => {
            parsed.set_query(Some(DEFAULT_USER_SOURCE_TAG));
            parsed.to_string()
        }
        _ => url.to_owned(),
    }
}

/// A user whose listing or profile is being fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTarget {
    pub user_id: String,
    /// The profile URL after source tagging.
    pub url: String,
    pub xsec_token: String,
    pub xsec_source: String,
}

impl UserTarget {
    /// Parses a profile URL such as
    /// `https://www.xiaohongshu.com/user/profile/<user_id>?xsec_token=…`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the URL does not parse or
    /// its final path segment is empty.
    pub fn parse(user_url: &str) -> Result<Self, PipelineError> {
        let tagged = ensure_source_tag(user_url.trim());
        let parsed = Url::parse(&tagged)
            .map_err(|e| PipelineError::invalid_input(user_url, e.to_string()))?;
        let user_id = final_segment(&parsed)
            .ok_or_else(|| PipelineError::invalid_input(user_url, "URL has no user id segment"))?;

        Ok(Self {
            user_id,
            xsec_token: query_value(&parsed, "xsec_token").unwrap_or_default(),
            xsec_source: query_value(&parsed, "xsec_source").unwrap_or_default(),
            url: tagged,
        })
    }
}

/// A single post addressed by its public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTarget {
    pub note_id: String,
    pub url: String,
    pub xsec_token: String,
    pub xsec_source: String,
}

impl NoteTarget {
    /// Parses a post URL such as `https://www.xiaohongshu.com/explore/<id>`
    /// or `/discovery/item/<id>`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the URL does not parse or
    /// its final path segment is empty.
    pub fn parse(note_url: &str) -> Result<Self, PipelineError> {
        let trimmed = note_url.trim();
        let parsed =
            Url::parse(trimmed).map_err(|e| PipelineError::invalid_input(note_url, e.to_string()))?;
        let note_id = final_segment(&parsed)
            .ok_or_else(|| PipelineError::invalid_input(note_url, "URL has no note id segment"))?;

        Ok(Self {
            note_id,
            xsec_token: query_value(&parsed, "xsec_token").unwrap_or_default(),
            xsec_source: query_value(&parsed, "xsec_source")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_NOTE_SOURCE.to_owned()),
            url: trimmed.to_owned(),
        })
    }
}

/// `<scheme>://<host>[:port]` of `url`, or `None` if it does not parse.
#[must_use]
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn final_segment(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let last = last.trim();
    (!last.is_empty()).then(|| last.to_owned())
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
