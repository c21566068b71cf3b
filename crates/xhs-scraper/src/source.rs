use async_trait::async_trait;
use xhs_core::Credential;

use crate::error::ScraperError;
use crate::target::UserTarget;
use crate::types::{FeedResponse, RawUserProfile, UserNotesPage};

/// Raw access to the platform. Implementations own transport concerns
/// (proxy, pacing, retries); callers see one call per logical fetch.
#[async_trait]
pub trait NoteSource: Send + Sync {
    /// Base URL of the public web host, used to build post and profile links.
    fn web_base_url(&self) -> &str;

    /// Fetches the detail feed for one post URL.
    ///
    /// The returned envelope is passed through as-is; an absent `data` or
    /// `items` is for the caller to interpret.
    async fn fetch_note_detail(
        &self,
        note_url: &str,
        credential: &Credential,
    ) -> Result<FeedResponse, ScraperError>;

    /// Fetches one page of a user's post listing. `cursor` is empty for the
    /// first page.
    async fn fetch_user_notes_page(
        &self,
        user: &UserTarget,
        cursor: &str,
        credential: &Credential,
    ) -> Result<UserNotesPage, ScraperError>;

    async fn fetch_user_profile(
        &self,
        user: &UserTarget,
        credential: &Credential,
    ) -> Result<RawUserProfile, ScraperError>;
}
