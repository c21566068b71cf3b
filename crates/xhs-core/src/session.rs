use crate::error::PipelineError;

/// Opaque session cookie string sent with every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a cookie string. Returns `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Picks the credential for one invocation: an explicit per-call value
    /// wins over the configured one. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingCredential`] if neither source yields
    /// a non-blank value.
    pub fn resolve(
        explicit: Option<&str>,
        configured: Option<&Credential>,
    ) -> Result<Self, PipelineError> {
        explicit
            .and_then(Self::new)
            .or_else(|| configured.cloned())
            .ok_or(PipelineError::MissingCredential)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([redacted])")
    }
}

/// Outbound proxy applied to both HTTP and HTTPS traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
