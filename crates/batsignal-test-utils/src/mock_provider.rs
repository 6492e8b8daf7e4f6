// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat provider for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use batsignal_core::traits::{PluginAdapter, ProviderAdapter};
use batsignal_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage};
use batsignal_core::{BatsignalError, ProviderErrorKind};

/// One scripted outcome of [`MockProvider::complete`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail {
        kind: ProviderErrorKind,
        status: Option<u16>,
    },
}

/// A provider that pops scripted replies from a FIFO queue.
///
/// An empty queue answers `"I am Batman."`. Every request is captured for
/// later inspection.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loads text replies.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = responses
            .into_iter()
            .map(|s| MockReply::Text(s.into()))
            .collect();
        Self {
            replies: Arc::new(Mutex::new(replies)),
            ..Self::default()
        }
    }

    /// A provider whose every call fails with `kind`.
    pub fn failing(kind: ProviderErrorKind, status: Option<u16>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from([MockReply::Fail { kind, status }]))),
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> MockReply {
        let mut queue = self.replies.lock().await;
        match queue.front() {
            // A lone failure repeats so `failing` providers fail every call.
            Some(MockReply::Fail { .. }) if queue.len() == 1 => queue[0].clone(),
            _ => queue
                .pop_front()
                .unwrap_or_else(|| MockReply::Text("I am Batman.".to_string())),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BatsignalError> {
        let model = request.model.clone().unwrap_or_else(|| "mock-model".to_string());
        self.requests.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply().await {
            MockReply::Text(content) => Ok(ProviderResponse {
                id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
                content,
                model,
                finish_reason: Some("stop".to_string()),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                },
            }),
            MockReply::Fail { kind, status } => Err(BatsignalError::Provider {
                kind,
                status,
                message: format!("mock failure ({kind})"),
                source: None,
            }),
        }
    }
}
