//! Bounded-timeout, bounded-retry JSON fetch shared by every upstream call.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use tracing::{instrument, warn};

use obs_common::{ObsError, ObsResult};

/// Base delay for the linear retry backoff.
const RETRY_DELAY: Duration = Duration::from_millis(500);
/// How much response body to keep in error diagnostics.
const SNIPPET_LEN: usize = 200;

/// Per-call options for [`FetchClient::fetch_json`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Extra headers for this call.
    pub headers: HeaderMap,
    /// Bound on each individual attempt; the in-flight request is dropped
    /// when it elapses.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Short label naming the upstream, carried into errors and logs.
    pub tag: &'static str,
}

impl FetchOptions {
    pub fn new(tag: &'static str, timeout: Duration, retries: u32) -> Self {
        Self {
            headers: HeaderMap::new(),
            timeout,
            retries,
            tag,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// JSON fetch client wrapping one shared HTTP client.
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Build the underlying HTTP client with the given User-Agent.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a URL and parse the body as JSON.
    ///
    /// Makes `retries + 1` attempts in total, sleeping `500ms * attempt`
    /// between them. The final attempt's error is the one propagated.
    #[instrument(skip(self, opts), fields(tag = opts.tag))]
    pub async fn fetch_json(&self, url: &str, opts: &FetchOptions) -> ObsResult<Value> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.attempt(url, opts).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt <= opts.retries => {
                    warn!(
                        tag = opts.tag,
                        url = %url,
                        attempt = attempt,
                        error = %e,
                        "Upstream fetch failed, retrying"
                    );
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One attempt: network errors, non-2xx statuses, and non-JSON bodies
    /// each map to their own error kind, with a body snippet where one
    /// exists.
    async fn attempt(&self, url: &str, opts: &FetchOptions) -> ObsResult<Value> {
        let response = self
            .client
            .get(url)
            .headers(opts.headers.clone())
            .timeout(opts.timeout)
            .send()
            .await
            .map_err(|e| ObsError::UpstreamNetwork {
                tag: opts.tag.to_string(),
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ObsError::UpstreamNetwork {
                tag: opts.tag.to_string(),
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(ObsError::UpstreamHttp {
                tag: opts.tag.to_string(),
                status: status.as_u16(),
                url: url.to_string(),
                body_snippet: snippet(&body),
            });
        }

        serde_json::from_str(&body).map_err(|_| ObsError::UpstreamFormat {
            tag: opts.tag.to_string(),
            url: url.to_string(),
            body_snippet: snippet(&body),
        })
    }
}

/// First 200 characters of a body, for error diagnostics.
fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}
