use thiserror::Error;
use xhs_core::ItemError;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited on {endpoint} (retry after {retry_after_secs}s)")]
    RateLimited {
        endpoint: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The platform answered 200 but flagged the call as unsuccessful.
    #[error("API error {code}: {msg}")]
    Api { code: i64, msg: String },

    #[error("response from {context} carried no data")]
    MissingData { context: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("pagination limit reached for user {user_id}: exceeded {max_pages} pages")]
    PaginationLimit { user_id: String, max_pages: usize },
}

impl From<ScraperError> for ItemError {
    fn from(err: ScraperError) -> Self {
        match err {
            ScraperError::Deserialize { context, .. } => ItemError::MalformedResponse {
                detail: format!("undecodable body from {context}"),
            },
            other => ItemError::FetchFailed {
                message: other.to_string(),
            },
        }
    }
}
