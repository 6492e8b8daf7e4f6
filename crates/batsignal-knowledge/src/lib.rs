// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge retrieval for batsignal.
//!
//! A small in-memory vector store ranked by cosine similarity. Texts are
//! embedded locally, by all-MiniLM-L6-v2 through ONNX Runtime or by a
//! deterministic feature-hashing embedder that needs no model files.

pub mod embedder;
pub mod local;
pub mod model_manager;
pub mod onnx;
pub mod seed;
pub mod store;
pub mod types;

pub use embedder::HashingEmbedder;
pub use local::LocalEmbedder;
pub use model_manager::ModelManager;
pub use onnx::OnnxEmbedder;
pub use seed::persona_seed;
pub use store::KnowledgeBase;
pub use types::{cosine_similarity, default_metadata};

use batsignal_config::model::KnowledgeConfig;
use batsignal_core::BatsignalError;
use tracing::info;

/// Builds the knowledge base described by `[knowledge]`, seeding the
/// persona style snippets when `seed_persona` is set.
///
/// `kb.embedder().kind()` reports which embedder ended up in use.
pub async fn from_config(
    config: &KnowledgeConfig,
) -> Result<KnowledgeBase<LocalEmbedder>, BatsignalError> {
    let kb = KnowledgeBase::new(LocalEmbedder::from_config(config).await?);
    if config.seed_persona {
        let ids = kb.store_batch(persona_seed()).await?;
        info!(count = ids.len(), "seeded persona knowledge");
    }
    Ok(kb)
}
