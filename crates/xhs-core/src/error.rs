use serde::Serialize;
use thiserror::Error;

/// Failures that abort a whole pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid input \"{input}\": {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("no session credential available; pass one explicitly or set XHS_COOKIES")]
    MissingCredential,

    #[error("listing failed: {reason}")]
    ListingFailed { reason: String },

    /// Only raised by the standalone profile lookup; a user crawl logs the
    /// failure and carries on without a profile.
    #[error("profile lookup failed: {reason}")]
    ProfileFailed { reason: String },
}

impl PipelineError {
    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Per-item failure captured into [`crate::BatchResult::failed`].
///
/// The `Display` form is the short reason string shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ItemError {
    /// The upstream call itself failed (transport, status, API-level error).
    #[error("FetchFailed: {message}")]
    FetchFailed { message: String },

    /// The response lacked the expected `data.items` container.
    #[error("MalformedResponse: {detail}")]
    MalformedResponse { detail: String },

    /// The response carried an empty item list.
    #[error("NotFound")]
    NotFound,

    /// The listing entry had no usable note id; the resolver was not invoked.
    #[error("MissingIdentifier")]
    MissingIdentifier,

    /// The batch was cancelled before this item resolved.
    #[error("Cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
