use std::net::SocketAddr;
use std::path::PathBuf;

use crate::session::{Credential, ProxyConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Session cookie used when a caller does not supply one.
    pub cookies: Option<Credential>,
    pub proxy: Option<ProxyConfig>,
    /// Host serving the JSON API endpoints.
    pub api_base_url: String,
    /// Host serving public post and profile pages.
    pub web_base_url: String,
    /// Root for `excel_datas/` and `media_datas/`.
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_notes: usize,
    pub media_concurrency: usize,
    pub min_request_gap_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub dedupe_listing: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("cookies", &self.cookies.as_ref().map(|_| "[redacted]"))
            .field("proxy", &self.proxy)
            .field("api_base_url", &self.api_base_url)
            .field("web_base_url", &self.web_base_url)
            .field("output_dir", &self.output_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_notes", &self.max_concurrent_notes)
            .field("media_concurrency", &self.media_concurrency)
            .field("min_request_gap_ms", &self.min_request_gap_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("dedupe_listing", &self.dedupe_listing)
            .finish()
    }
}
