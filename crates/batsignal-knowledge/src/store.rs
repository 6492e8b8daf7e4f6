// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory snippet store ranked by cosine similarity.

use async_trait::async_trait;
use batsignal_core::error::BatsignalError;
use batsignal_core::traits::{EmbeddingAdapter, KnowledgeAdapter, PluginAdapter};
use batsignal_core::types::{
    AdapterType, EmbeddingInput, HealthStatus, KnowledgeSnippet, SnippetMetadata,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{cosine_similarity, default_metadata};

struct Entry {
    id: String,
    text: String,
    metadata: SnippetMetadata,
    embedding: Vec<f32>,
}

/// Vector knowledge base over any [`EmbeddingAdapter`].
///
/// Entries are kept in insertion order; ids are `id0`, `id1`, ... assigned
/// at store time and never reused.
pub struct KnowledgeBase<E> {
    embedder: E,
    entries: RwLock<Vec<Entry>>,
}

impl<E: EmbeddingAdapter> KnowledgeBase<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Stores several snippets with one embedding call and returns their ids
    /// in input order. Empty metadata is replaced by [`default_metadata`].
    pub async fn store_batch(
        &self,
        items: Vec<(String, SnippetMetadata)>,
    ) -> Result<Vec<String>, BatsignalError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let texts = items.iter().map(|(text, _)| text.clone()).collect();
        let output = self.embedder.embed(EmbeddingInput { texts }).await?;
        if output.embeddings.len() != items.len() {
            return Err(BatsignalError::Knowledge(format!(
                "embedder returned {} vectors for {} texts",
                output.embeddings.len(),
                items.len()
            )));
        }

        let mut entries = self.entries.write().await;
        let mut ids = Vec::with_capacity(items.len());
        for ((text, metadata), embedding) in items.into_iter().zip(output.embeddings) {
            let id = format!("id{}", entries.len());
            let metadata = if metadata.is_empty() {
                default_metadata()
            } else {
                metadata
            };
            entries.push(Entry {
                id: id.clone(),
                text,
                metadata,
                embedding,
            });
            ids.push(id);
        }
        debug!(count = ids.len(), total = entries.len(), "stored knowledge snippets");
        Ok(ids)
    }
}

#[async_trait]
impl<E: EmbeddingAdapter> PluginAdapter for KnowledgeBase<E> {
    fn name(&self) -> &str {
        "knowledge-base"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Knowledge
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        self.embedder.health_check().await
    }
}

#[async_trait]
impl<E: EmbeddingAdapter> KnowledgeAdapter for KnowledgeBase<E> {
    async fn store(&self, text: &str, metadata: SnippetMetadata) -> Result<String, BatsignalError> {
        let mut ids = self.store_batch(vec![(text.to_string(), metadata)]).await?;
        ids.pop()
            .ok_or_else(|| BatsignalError::Knowledge("store produced no id".into()))
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<KnowledgeSnippet>, BatsignalError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        let query = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| BatsignalError::Knowledge("embedding returned no results".into()))?;

        let entries = self.entries.read().await;
        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(&query, &entry.embedding)))
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| {
                let entry = &entries[i];
                KnowledgeSnippet {
                    id: entry.id.clone(),
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                    score,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashingEmbedder;

    fn kb() -> KnowledgeBase<HashingEmbedder> {
        KnowledgeBase::new(HashingEmbedder::new(256))
    }

    #[tokio::test]
    async fn ids_are_sequential_across_calls() {
        let kb = kb();
        let first = kb
            .store_batch(vec![
                ("alpha".into(), SnippetMetadata::new()),
                ("beta".into(), SnippetMetadata::new()),
            ])
            .await
            .unwrap();
        let third = kb.store("gamma", SnippetMetadata::new()).await.unwrap();

        assert_eq!(first, ["id0", "id1"]);
        assert_eq!(third, "id2");
        assert_eq!(kb.len().await, 3);
    }

    #[tokio::test]
    async fn empty_metadata_gets_defaults() {
        let kb = kb();
        kb.store("Gotham needs me", SnippetMetadata::new()).await.unwrap();
        let hits = kb.query("gotham", 1).await.unwrap();
        assert_eq!(hits[0].metadata["source"], "default");
        assert_eq!(hits[0].metadata["type"], "general_knowledge");
    }

    #[tokio::test]
    async fn query_orders_by_relevance() {
        let kb = kb();
        kb.store("The Batmobile is parked in the cave", SnippetMetadata::new())
            .await
            .unwrap();
        kb.store("Alfred serves tea at noon", SnippetMetadata::new())
            .await
            .unwrap();
        kb.store("The cave hides the Batmobile", SnippetMetadata::new())
            .await
            .unwrap();

        let hits = kb.query("where is the batmobile cave", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.text.contains("Batmobile")));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn query_caps_at_k_and_store_size() {
        let kb = kb();
        assert!(kb.query("anything", 3).await.unwrap().is_empty());

        kb.store("one", SnippetMetadata::new()).await.unwrap();
        assert_eq!(kb.query("one", 3).await.unwrap().len(), 1);
        assert!(kb.query("one", 0).await.unwrap().is_empty());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let kb = kb();
        assert_eq!(kb.name(), "knowledge-base");
        assert_eq!(kb.adapter_type(), AdapterType::Knowledge);
    }
}
