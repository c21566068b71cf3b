use crate::app_config::{AppConfig, Environment};
use crate::session::{Credential, ProxyConfig};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://edith.xiaohongshu.com";
pub const DEFAULT_WEB_BASE_URL: &str = "https://www.xiaohongshu.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Nothing is strictly required: the session cookie may arrive per call, so
/// its absence is only reported when a pipeline actually needs it.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("XHS_ENV", "development"))?;

    let bind_addr = or_default("XHS_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("XHS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("XHS_LOG_LEVEL", "info");
    let cookies = lookup("XHS_COOKIES").ok().and_then(Credential::new);
    let proxy = parse_proxy(lookup("PROXY_HOST").ok(), lookup("PROXY_PORT").ok())?;

    let api_base_url = or_default("XHS_API_BASE_URL", DEFAULT_API_BASE_URL);
    let web_base_url = or_default("XHS_WEB_BASE_URL", DEFAULT_WEB_BASE_URL);
    let output_dir = PathBuf::from(or_default("XHS_OUTPUT_DIR", "./datas"));

    let request_timeout_secs = parse_u64("XHS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("XHS_USER_AGENT", DEFAULT_USER_AGENT);
    let max_concurrent_notes = parse_usize("XHS_MAX_CONCURRENT_NOTES", "2")?;
    let media_concurrency = parse_usize("XHS_MEDIA_CONCURRENCY", "4")?;
    let min_request_gap_ms = parse_u64("XHS_MIN_REQUEST_GAP_MS", "1000")?;
    let max_retries = parse_u32("XHS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("XHS_RETRY_BACKOFF_BASE_MS", "1000")?;
    let dedupe_listing = parse_bool("XHS_DEDUPE_LISTING", &or_default("XHS_DEDUPE_LISTING", "true"))?;

    if max_concurrent_notes == 0 {
        return Err(invalid("XHS_MAX_CONCURRENT_NOTES", "must be at least 1".into()));
    }
    if media_concurrency == 0 {
        return Err(invalid("XHS_MEDIA_CONCURRENCY", "must be at least 1".into()));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        cookies,
        proxy,
        api_base_url,
        web_base_url,
        output_dir,
        request_timeout_secs,
        user_agent,
        max_concurrent_notes,
        media_concurrency,
        min_request_gap_ms,
        max_retries,
        retry_backoff_base_ms,
        dedupe_listing,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "XHS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Both halves must be set for a proxy to apply; a host without a port (or
/// the reverse) is a configuration mistake.
fn parse_proxy(
    host: Option<String>,
    port: Option<String>,
) -> Result<Option<ProxyConfig>, ConfigError> {
    let host = host.filter(|h| !h.trim().is_empty());
    let port = port.filter(|p| !p.trim().is_empty());
    match (host, port) {
        (None, None) => Ok(None),
        (Some(host), Some(port)) => {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "PROXY_PORT".to_string(),
                    reason: e.to_string(),
                })?;
            Ok(Some(ProxyConfig {
                host: host.trim().to_string(),
                port,
            }))
        }
        (Some(_), None) => Err(ConfigError::MissingEnvVar("PROXY_PORT".to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar("PROXY_HOST".to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
