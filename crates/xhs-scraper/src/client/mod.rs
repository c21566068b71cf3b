//! HTTP client for the platform's web JSON API.

mod request;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use xhs_core::{AppConfig, Credential, ProxyConfig};

use crate::error::ScraperError;
use crate::governor::RequestGate;
use crate::source::NoteSource;
use crate::target::{NoteTarget, UserTarget};
use crate::types::{FeedData, FeedResponse, RawUserNotesData, RawUserProfile, UserNotesPage};

pub(crate) const FEED_PATH: &str = "/api/sns/web/v1/feed";
pub(crate) const USER_POSTED_PATH: &str = "/api/sns/web/v1/user_posted";
pub(crate) const USER_INFO_PATH: &str = "/api/sns/web/v1/user/otherinfo";

/// Page size requested from the listing endpoint.
const LISTING_PAGE_SIZE: &str = "30";
const IMAGE_FORMATS: [&str; 3] = ["jpg", "webp", "avif"];

/// Construction parameters for [`XhsClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub web_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub proxy: Option<ProxyConfig>,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^(n-1)`.
    pub backoff_base_ms: u64,
    /// Minimum spacing between any two API requests made by this client.
    pub min_request_gap_ms: u64,
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            web_base_url: config.web_base_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            proxy: config.proxy.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            min_request_gap_ms: config.min_request_gap_ms,
        }
    }
}

/// [`NoteSource`] backed by the platform's web API.
///
/// Every request carries the caller's session cookie, passes through a
/// shared [`RequestGate`], and is retried with back-off on transient errors.
/// Requests are not signed; endpoints that insist on signatures answer with
/// an API error, which surfaces as a per-item failure.
pub struct XhsClient {
    pub(super) client: Client,
    pub(super) api_base_url: String,
    pub(super) web_base_url: String,
    pub(super) max_retries: u32,
    pub(super) backoff_base_ms: u64,
    pub(super) gate: RequestGate,
}

impl XhsClient {
    /// Creates an `XhsClient` with the configured timeout, user agent,
    /// proxy, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the proxy URL is rejected or the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn new(settings: ClientSettings) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent);

        if let Some(proxy) = &settings.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.url())?);
            tracing::info!(host = %proxy.host, port = proxy.port, "routing upstream traffic through proxy");
        }

        Ok(Self {
            client: builder.build()?,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_owned(),
            web_base_url: settings.web_base_url.trim_end_matches('/').to_owned(),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
            gate: RequestGate::new(Duration::from_millis(settings.min_request_gap_ms)),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

#[async_trait]
impl NoteSource for XhsClient {
    fn web_base_url(&self) -> &str {
        &self.web_base_url
    }

    async fn fetch_note_detail(
        &self,
        note_url: &str,
        credential: &Credential,
    ) -> Result<FeedResponse, ScraperError> {
        let target = NoteTarget::parse(note_url).map_err(|e| ScraperError::InvalidUrl {
            url: note_url.to_owned(),
            reason: e.to_string(),
        })?;
        let url = self.endpoint(FEED_PATH);
        let body = json!({
            "source_note_id": target.note_id,
            "image_formats": IMAGE_FORMATS,
            "extra": { "need_body_topic": "1" },
            "xsec_source": target.xsec_source,
            "xsec_token": target.xsec_token,
        });

        self.send_api::<FeedData, _>(FEED_PATH, credential, || {
            self.client.post(&url).json(&body)
        })
        .await
    }

    async fn fetch_user_notes_page(
        &self,
        user: &UserTarget,
        cursor: &str,
        credential: &Credential,
    ) -> Result<UserNotesPage, ScraperError> {
        let url = self.endpoint(USER_POSTED_PATH);
        let image_formats = IMAGE_FORMATS.join(",");
        let query = [
            ("num", LISTING_PAGE_SIZE),
            ("cursor", cursor),
            ("user_id", user.user_id.as_str()),
            ("image_formats", image_formats.as_str()),
            ("xsec_token", user.xsec_token.as_str()),
            ("xsec_source", user.xsec_source.as_str()),
        ];

        let envelope = self
            .send_api::<RawUserNotesData, _>(USER_POSTED_PATH, credential, || {
                self.client.get(&url).query(&query)
            })
            .await?;

        envelope
            .data
            .map(UserNotesPage::from)
            .ok_or_else(|| ScraperError::MissingData {
                context: format!("listing page for user {}", user.user_id),
            })
    }

    async fn fetch_user_profile(
        &self,
        user: &UserTarget,
        credential: &Credential,
    ) -> Result<RawUserProfile, ScraperError> {
        let url = self.endpoint(USER_INFO_PATH);
        let query = [("target_user_id", user.user_id.as_str())];

        let envelope = self
            .send_api::<RawUserProfile, _>(USER_INFO_PATH, credential, || {
                self.client.get(&url).query(&query)
            })
            .await?;

        envelope.data.ok_or_else(|| ScraperError::MissingData {
            context: format!("profile of user {}", user.user_id),
        })
    }
}
