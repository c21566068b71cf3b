//! Shared request path: pacing, cookie, status mapping, envelope decoding.

use reqwest::header::{ACCEPT, COOKIE, ORIGIN, REFERER, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use xhs_core::Credential;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::ApiEnvelope;

use super::XhsClient;

/// Platform code for "too many requests" delivered inside a 200 response.
const API_RATE_LIMIT_CODE: i64 = 300_013;

impl XhsClient {
    /// Sends the request produced by `build` and decodes the API envelope.
    ///
    /// `build` is invoked once per attempt so retries resend a fresh request.
    /// An envelope with `success == false` becomes [`ScraperError::Api`]
    /// (or [`ScraperError::RateLimited`] for the platform's throttle code).
    pub(super) async fn send_api<T, F>(
        &self,
        endpoint: &str,
        credential: &Credential,
        build: F,
    ) -> Result<ApiEnvelope<T>, ScraperError>
    where
        T: DeserializeOwned + Default,
        F: Fn() -> RequestBuilder,
    {
        let referer = format!("{}/", self.web_base_url);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = build()
                .header(ACCEPT, "application/json, text/plain, */*")
                .header(COOKIE, credential.expose())
                .header(ORIGIN, self.web_base_url.as_str())
                .header(REFERER, referer.as_str());
            async move {
                self.gate.wait().await;
                let response = request.send().await?;
                let status = response.status();
                let url = response.url().to_string();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    return Err(ScraperError::RateLimited {
                        endpoint: endpoint.to_owned(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                let envelope = serde_json::from_str::<ApiEnvelope<T>>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: endpoint.to_owned(),
                        source: e,
                    }
                })?;

                if !envelope.success {
                    if envelope.code == API_RATE_LIMIT_CODE {
                        return Err(ScraperError::RateLimited {
                            endpoint: endpoint.to_owned(),
                            retry_after_secs: 0,
                        });
                    }
                    return Err(ScraperError::Api {
                        code: envelope.code,
                        msg: envelope.msg.unwrap_or_default(),
                    });
                }

                tracing::debug!(endpoint, status = status.as_u16(), "upstream call succeeded");
                Ok(envelope)
            }
        })
        .await
    }
}
