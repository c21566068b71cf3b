//! The two entry flows: crawl a user's whole listing, or crawl a given set
//! of post URLs.

use tokio_util::sync::CancellationToken;
use xhs_core::{AppConfig, BatchResult, Credential, PipelineError, UserProfile};
use xhs_scraper::{
    list_user_posts, normalize_profile, resolve_detail, DetailTarget, NoteSource, NoteTarget,
    UserTarget,
};

use crate::batch::{run_batch, BatchInput};
use crate::dedupe::dedupe_summaries;

/// Knobs shared by both crawl flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    pub max_concurrent_notes: usize,
    /// Drop repeated note ids from a user listing before resolving.
    pub dedupe_listing: bool,
}

impl CrawlSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_notes: config.max_concurrent_notes,
            dedupe_listing: config.dedupe_listing,
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_concurrent_notes: 2,
            dedupe_listing: true,
        }
    }
}

/// Outcome of [`crawl_user`].
#[derive(Debug, Clone)]
pub struct UserCrawl {
    pub user_id: String,
    /// `None` when the profile lookup failed; the crawl still ran.
    pub profile: Option<UserProfile>,
    /// Default base name for output artifacts.
    pub output_name: String,
    pub result: BatchResult,
}

/// Looks up the public profile behind `user_url`.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if the URL has no usable user id.
/// - [`PipelineError::ProfileFailed`] if the upstream lookup fails.
pub async fn fetch_profile<S>(
    source: &S,
    user_url: &str,
    credential: &Credential,
) -> Result<UserProfile, PipelineError>
where
    S: NoteSource + ?Sized,
{
    let target = UserTarget::parse(user_url)?;
    let raw = source
        .fetch_user_profile(&target, credential)
        .await
        .map_err(|e| PipelineError::ProfileFailed {
            reason: e.to_string(),
        })?;
    Ok(normalize_profile(&target.user_id, &raw))
}

/// Crawls every post of the user behind `user_url`.
///
/// The profile is fetched first and only used for naming and the snapshot;
/// failing to get it is logged, not fatal. The listing is all-or-nothing.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if the URL has no usable user id.
/// - [`PipelineError::ListingFailed`] if any listing page fails.
pub async fn crawl_user<S>(
    source: &S,
    settings: &CrawlSettings,
    user_url: &str,
    credential: &Credential,
    cancel: &CancellationToken,
) -> Result<UserCrawl, PipelineError>
where
    S: NoteSource + ?Sized,
{
    let target = UserTarget::parse(user_url)?;

    let profile = match fetch_profile(source, user_url, credential).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(user_id = %target.user_id, error = %e, "continuing without user profile");
            None
        }
    };

    let mut summaries = list_user_posts(source, user_url, credential).await?;
    if settings.dedupe_listing {
        let before = summaries.len();
        summaries = dedupe_summaries(summaries);
        let dropped = before - summaries.len();
        if dropped > 0 {
            tracing::info!(user_id = %target.user_id, dropped, "dropped repeated listing entries");
        }
    }

    let web_base = source.web_base_url();
    let inputs = summaries
        .into_iter()
        .enumerate()
        .map(|(idx, summary)| {
            let target = DetailTarget::Summary(summary);
            match target.note_url(web_base) {
                Some(url) => BatchInput::new(url, Some(target)),
                None => BatchInput::new(format!("listing entry #{}", idx + 1), None),
            }
        })
        .collect();

    let result = run_batch(inputs, settings.max_concurrent_notes, cancel, |target| async move {
        resolve_detail(source, &target, credential).await
    })
    .await;

    let output_name = profile
        .as_ref()
        .map_or_else(|| target.user_id.clone(), UserProfile::output_name);

    Ok(UserCrawl {
        user_id: target.user_id,
        profile,
        output_name,
        result,
    })
}

/// Crawls an explicit list of post URLs.
///
/// Every URL is validated before any request is made.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] for the first malformed URL.
pub async fn crawl_posts<S>(
    source: &S,
    settings: &CrawlSettings,
    urls: &[String],
    credential: &Credential,
    cancel: &CancellationToken,
) -> Result<BatchResult, PipelineError>
where
    S: NoteSource + ?Sized,
{
    for url in urls {
        NoteTarget::parse(url)?;
    }

    let inputs = urls
        .iter()
        .map(|url| {
            let url = url.trim().to_owned();
            BatchInput::new(url.clone(), Some(DetailTarget::Url(url)))
        })
        .collect();

    Ok(
        run_batch(inputs, settings.max_concurrent_notes, cancel, |target| async move {
            resolve_detail(source, &target, credential).await
        })
        .await,
    )
}

/// Output base name for a post-list crawl: `notes_<UTC timestamp>`.
#[must_use]
pub fn default_batch_name() -> String {
    format!("notes_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_name_is_timestamped() {
        let name = default_batch_name();
        assert!(name.starts_with("notes_"));
        assert_eq!(name.len(), "notes_20240101_120000".len());
    }
}
