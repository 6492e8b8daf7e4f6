// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Groq chat completions endpoint.
//!
//! [`GroqClient`] handles bearer authentication, maps HTTP failures onto
//! [`ProviderErrorKind`], and optionally retries timeouts and transient
//! statuses. An attempt that exceeds the client timeout is reported as
//! [`BatsignalError::Timeout`], never as a network error.

use std::time::Duration;

use batsignal_core::{BatsignalError, ProviderErrorKind};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// Default backoff unit between retries; retry `n` waits `n` units.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// HTTP client for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GroqClient {
    /// Builds a client that authenticates with `api_key` and aborts any
    /// request that takes longer than `timeout`.
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BatsignalError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| BatsignalError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BatsignalError::Provider {
                kind: ProviderErrorKind::Network,
                status: None,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            default_model: default_model.into(),
            timeout,
            max_retries: 0,
            retry_backoff: RETRY_BACKOFF,
        })
    }

    /// Retries timeouts and transient statuses (429, 500, 502, 503) up to
    /// `max_retries` times.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Overrides the endpoint URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends one completion request and returns the parsed response.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BatsignalError> {
        let mut attempt = 0;
        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    attempt += 1;
                    warn!(attempt, error = %err, "transient provider error, will retry");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BatsignalError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, None, "HTTP request failed"))?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        let body = response.text().await.map_err(|e| {
            self.transport_error(e, Some(status.as_u16()), "failed to read response body")
        })?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            return Err(BatsignalError::Provider {
                kind: classify_status(status),
                status: Some(status.as_u16()),
                message: format!("API returned {status}: {detail}"),
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| BatsignalError::Provider {
            kind: ProviderErrorKind::MalformedResponse,
            status: Some(status.as_u16()),
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

impl GroqClient {
    fn transport_error(
        &self,
        err: reqwest::Error,
        status: Option<u16>,
        context: &str,
    ) -> BatsignalError {
        if err.is_timeout() {
            return BatsignalError::Timeout {
                duration: self.timeout,
            };
        }
        BatsignalError::Provider {
            kind: ProviderErrorKind::Network,
            status,
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Maps a non-success HTTP status to a failure kind.
pub fn classify_status(status: StatusCode) -> ProviderErrorKind {
    match status.as_u16() {
        401 | 403 => ProviderErrorKind::Auth,
        429 => ProviderErrorKind::RateLimited,
        _ => ProviderErrorKind::Upstream,
    }
}

fn is_retryable(err: &BatsignalError) -> bool {
    matches!(
        err,
        BatsignalError::Timeout { .. }
            | BatsignalError::Provider {
                status: Some(429 | 500 | 502 | 503),
                ..
            }
    )
}
