//! HTTP client for the PostgREST API of a Supabase project
//!
//! Handles authentication headers, URL building and response classification,
//! and retries requests that were rejected with HTTP 429.

use crate::store::error::StoreError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Longest pause between two attempts
const MAX_RETRY_DELAY_SECS: u64 = 60;

/// Options for the REST client
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to automatically retry requests when rate limited
    pub retry_on_rate_limit: bool,

    /// Maximum number of retry attempts for rate-limited requests
    pub max_retries: u32,

    /// Retry delay in seconds if no Retry-After header is provided
    pub default_retry_after_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_on_rate_limit: true,
            max_retries: 3,
            default_retry_after_secs: 2,
        }
    }
}

/// REST client bound to one project's `/rest/v1/` endpoint
#[derive(Clone)]
pub struct RestClient {
    client: ReqwestClient,
    base_url: Url,
    api_key: String,
    options: HttpOptions,
}

impl RestClient {
    /// Create a client for `project_url` (e.g. `https://xyz.supabase.co`)
    pub fn new(
        project_url: &str,
        api_key: impl Into<String>,
        options: HttpOptions,
    ) -> Result<Self, StoreError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;
        let base_url = Url::parse(&format!(
            "{}/rest/v1/",
            project_url.trim_end_matches('/')
        ))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            options,
        })
    }

    /// Start an authenticated request against `table`
    pub fn request(&self, method: Method, table: &str) -> Result<RequestBuilder, StoreError> {
        let url = self.base_url.join(table)?;

        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key))
    }

    /// Send a request and decode the JSON response
    #[instrument(skip(self, request), level = "debug")]
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        let body = self.execute_request(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse response: {}", e);
            StoreError::Json(e)
        })
    }

    /// Send a request whose response body is not needed
    #[instrument(skip(self, request), level = "debug")]
    pub async fn send(&self, request: RequestBuilder) -> Result<(), StoreError> {
        self.execute_request(request).await.map(|_| ())
    }

    /// Execute a request, retrying on 429, and return the response body
    async fn execute_request(&self, request: RequestBuilder) -> Result<String, StoreError> {
        let mut attempts = 0;

        loop {
            let request_clone = request.try_clone().ok_or_else(|| {
                StoreError::Connection("Failed to clone request for retry".to_string())
            })?;

            let response = request_clone.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;

                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(self.options.default_retry_after_secs);

                let response_text = response.text().await?;
                warn!("Rate limited: {} - {}", status, response_text);

                if self.options.retry_on_rate_limit && attempts <= self.options.max_retries {
                    let delay = retry_delay(retry_after, attempts);
                    debug!(
                        "Retrying after {} seconds (attempt {}/{})",
                        delay, attempts, self.options.max_retries
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    continue;
                }

                return Err(StoreError::RateLimit {
                    retry_after_secs: retry_after,
                });
            }

            let response_text = response.text().await?;

            if status.is_success() {
                return Ok(response_text);
            }

            error!("API error: {} - {}", status, response_text);
            return if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                Err(StoreError::Auth(response_text))
            } else {
                Err(StoreError::Api {
                    status_code: status.as_u16(),
                    message: response_text,
                })
            };
        }
    }
}

/// `base * 2^(attempt-1)`, capped
fn retry_delay(base_secs: u64, attempt: u32) -> u64 {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    base_secs.saturating_mul(factor).min(MAX_RETRY_DELAY_SECS)
}
