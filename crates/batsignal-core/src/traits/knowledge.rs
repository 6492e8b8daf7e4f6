// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge adapter trait for snippet storage and nearest-match retrieval.

use async_trait::async_trait;

use crate::error::BatsignalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{KnowledgeSnippet, SnippetMetadata};

/// Stores short text snippets and returns the closest matches to a query.
#[async_trait]
pub trait KnowledgeAdapter: PluginAdapter {
    /// Stores a snippet and returns its identifier.
    async fn store(&self, text: &str, metadata: SnippetMetadata)
        -> Result<String, BatsignalError>;

    /// Returns up to `k` snippets ordered from most to least relevant.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<KnowledgeSnippet>, BatsignalError>;
}
