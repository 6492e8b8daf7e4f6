// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local feature-hashing embedding adapter.
//!
//! Maps lowercased word unigrams and character trigrams into a fixed number
//! of signed buckets, then L2-normalizes. Deterministic across runs and
//! platforms, with no model files or network calls.

use async_trait::async_trait;
use batsignal_core::error::BatsignalError;
use batsignal_core::traits::{EmbeddingAdapter, PluginAdapter};
use batsignal_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use sha2::{Digest, Sha256};

use crate::types::l2_normalize;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder producing `dimensions`-wide vectors.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embeds one text. Text with no alphanumeric content maps to the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vec, b"w", word, WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            for tri in padded.windows(3) {
                let tri: String = tri.iter().collect();
                self.add_feature(&mut vec, b"c", &tri, TRIGRAM_WEIGHT);
            }
        }

        l2_normalize(&mut vec);
        vec
    }

    fn add_feature(&self, vec: &mut [f32], kind: &[u8], feature: &str, weight: f32) {
        let digest = Sha256::new()
            .chain_update(kind)
            .chain_update([0u8])
            .chain_update(feature.as_bytes())
            .finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(head);

        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vec[bucket] += sign * weight;
    }
}

#[async_trait]
impl PluginAdapter for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for HashingEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, BatsignalError> {
        let embeddings = input.texts.iter().map(|t| self.embed_text(t)).collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::cosine_similarity;

    #[test]
    fn embedding_is_deterministic_and_unit_length() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed_text("The night calls.");
        let b = embedder.embed_text("The night calls.");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let embedder = HashingEmbedder::new(128);
        assert_eq!(
            embedder.embed_text("Gotham needs me!"),
            embedder.embed_text("gotham NEEDS me")
        );
    }

    #[test]
    fn related_text_scores_higher_than_unrelated() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed_text("keep replies short");
        let related = embedder.embed_text("Keep responses short and natural");
        let unrelated = embedder.embed_text("Be empathetic and supportive");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_text("?!  ").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn embed_batch_preserves_order() {
        let embedder = HashingEmbedder::new(32);
        let output = embedder
            .embed(EmbeddingInput {
                texts: vec!["one".into(), "two".into()],
            })
            .await
            .unwrap();
        assert_eq!(output.dimensions, 32);
        assert_eq!(output.embeddings[0], embedder.embed_text("one"));
        assert_eq!(output.embeddings[1], embedder.embed_text("two"));
    }
}
