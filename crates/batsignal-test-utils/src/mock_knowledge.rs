// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock knowledge adapters.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use batsignal_core::traits::{KnowledgeAdapter, PluginAdapter};
use batsignal_core::types::{AdapterType, HealthStatus, KnowledgeSnippet, SnippetMetadata};
use batsignal_core::BatsignalError;

/// Returns the same snippets, capped at `k`, for every query.
#[derive(Clone, Default)]
pub struct StaticKnowledge {
    snippets: Arc<Mutex<Vec<KnowledgeSnippet>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticKnowledge {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let snippets = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| KnowledgeSnippet {
                id: format!("id{i}"),
                text: text.into(),
                metadata: SnippetMetadata::new(),
                score: 1.0,
            })
            .collect();
        Self {
            snippets: Arc::new(Mutex::new(snippets)),
            ..Self::default()
        }
    }

    /// Query texts received so far.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for StaticKnowledge {
    fn name(&self) -> &str {
        "static-knowledge"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Knowledge
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl KnowledgeAdapter for StaticKnowledge {
    async fn store(&self, text: &str, metadata: SnippetMetadata) -> Result<String, BatsignalError> {
        let mut snippets = self.snippets.lock().await;
        let id = format!("id{}", snippets.len());
        snippets.push(KnowledgeSnippet {
            id: id.clone(),
            text: text.to_string(),
            metadata,
            score: 1.0,
        });
        Ok(id)
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<KnowledgeSnippet>, BatsignalError> {
        self.queries.lock().await.push(text.to_string());
        let snippets = self.snippets.lock().await;
        Ok(snippets.iter().take(k).cloned().collect())
    }
}

/// Knowledge adapter whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingKnowledge;

#[async_trait]
impl PluginAdapter for FailingKnowledge {
    fn name(&self) -> &str {
        "failing-knowledge"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Knowledge
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        Ok(HealthStatus::Unhealthy("always fails".into()))
    }
}

#[async_trait]
impl KnowledgeAdapter for FailingKnowledge {
    async fn store(&self, _text: &str, _metadata: SnippetMetadata) -> Result<String, BatsignalError> {
        Err(BatsignalError::Knowledge("store unavailable".into()))
    }

    async fn query(&self, _text: &str, _k: usize) -> Result<Vec<KnowledgeSnippet>, BatsignalError> {
        Err(BatsignalError::Knowledge("query unavailable".into()))
    }
}
