// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The embedder chosen by `[knowledge]`, with the hashing fallback.

use async_trait::async_trait;
use batsignal_config::model::KnowledgeConfig;
use batsignal_core::error::BatsignalError;
use batsignal_core::traits::{EmbeddingAdapter, PluginAdapter};
use batsignal_core::types::{
    AdapterType, EmbedderKind, EmbeddingInput, EmbeddingOutput, HealthStatus,
};
use tracing::{info, warn};

use crate::embedder::HashingEmbedder;
use crate::model_manager::ModelManager;
use crate::onnx::OnnxEmbedder;

/// One of the two local embedders.
#[derive(Debug)]
pub enum LocalEmbedder {
    Onnx(OnnxEmbedder),
    Hashing(HashingEmbedder),
}

impl LocalEmbedder {
    /// The backend actually in use, which differs from the configured one
    /// after a fallback.
    pub fn kind(&self) -> EmbedderKind {
        match self {
            LocalEmbedder::Onnx(_) => EmbedderKind::Onnx,
            LocalEmbedder::Hashing(_) => EmbedderKind::Hashing,
        }
    }

    /// Builds the configured embedder.
    ///
    /// For `onnx`, a missing model is downloaded when `download_model` is
    /// set. Any failure to obtain or load it falls back to hashing when
    /// `fallback_to_hashing` is set and is returned otherwise.
    pub async fn from_config(config: &KnowledgeConfig) -> Result<Self, BatsignalError> {
        let hashing = || LocalEmbedder::Hashing(HashingEmbedder::new(config.dimensions));
        match config.embedder {
            EmbedderKind::Hashing => Ok(hashing()),
            EmbedderKind::Onnx => match load_onnx(config).await {
                Ok(onnx) => {
                    info!(dir = %config.model_dir, "ONNX embedder loaded");
                    Ok(LocalEmbedder::Onnx(onnx))
                }
                Err(e) if config.fallback_to_hashing => {
                    warn!(error = %e, "ONNX embedder unavailable, using hashing embedder");
                    Ok(hashing())
                }
                Err(e) => Err(e),
            },
        }
    }
}

async fn load_onnx(config: &KnowledgeConfig) -> Result<OnnxEmbedder, BatsignalError> {
    let manager = ModelManager::new(&config.model_dir);
    if !manager.is_model_available() {
        if !config.download_model {
            return Err(BatsignalError::Knowledge(format!(
                "embedding model not found in {} and knowledge.download_model is off",
                manager.model_dir().display()
            )));
        }
        manager.ensure_model().await?;
    }

    let dir = manager.model_dir().to_path_buf();
    tokio::task::spawn_blocking(move || OnnxEmbedder::load(&dir))
        .await
        .map_err(|e| BatsignalError::Internal(format!("model load task failed: {e}")))?
}

#[async_trait]
impl PluginAdapter for LocalEmbedder {
    fn name(&self) -> &str {
        match self {
            LocalEmbedder::Onnx(e) => e.name(),
            LocalEmbedder::Hashing(e) => e.name(),
        }
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        match self {
            LocalEmbedder::Onnx(e) => e.health_check().await,
            LocalEmbedder::Hashing(e) => e.health_check().await,
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for LocalEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, BatsignalError> {
        match self {
            LocalEmbedder::Onnx(e) => e.embed(input).await,
            LocalEmbedder::Hashing(e) => e.embed(input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onnx_config(dir: &std::path::Path) -> KnowledgeConfig {
        KnowledgeConfig {
            model_dir: dir.join("model").display().to_string(),
            download_model: false,
            ..KnowledgeConfig::default()
        }
    }

    #[tokio::test]
    async fn hashing_is_used_when_asked_for() {
        let config = KnowledgeConfig {
            embedder: EmbedderKind::Hashing,
            ..KnowledgeConfig::default()
        };
        let embedder = LocalEmbedder::from_config(&config).await.unwrap();
        assert_eq!(embedder.kind(), EmbedderKind::Hashing);
        assert_eq!(embedder.name(), "hashing-embedder");
    }

    #[tokio::test]
    async fn missing_model_falls_back_to_hashing() {
        let tmp = tempfile::tempdir().unwrap();
        let embedder = LocalEmbedder::from_config(&onnx_config(tmp.path())).await.unwrap();
        assert_eq!(embedder.kind(), EmbedderKind::Hashing);

        let output = embedder
            .embed(EmbeddingInput {
                texts: vec!["hello".into()],
            })
            .await
            .unwrap();
        assert_eq!(output.dimensions, 256);
    }

    #[tokio::test]
    async fn missing_model_without_fallback_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = KnowledgeConfig {
            fallback_to_hashing: false,
            ..onnx_config(tmp.path())
        };
        let err = LocalEmbedder::from_config(&config).await.unwrap_err();
        assert!(matches!(err, BatsignalError::Knowledge(_)), "got {err:?}");
        assert!(err.to_string().contains("download_model"));
    }

    #[tokio::test]
    async fn unreadable_model_files_fall_back() {
        let tmp = tempfile::tempdir().unwrap();
        let config = onnx_config(tmp.path());
        std::fs::create_dir_all(&config.model_dir).unwrap();
        let dir = std::path::Path::new(&config.model_dir);
        std::fs::write(dir.join("model.onnx"), b"not a graph").unwrap();
        std::fs::write(dir.join("tokenizer.json"), b"not a tokenizer").unwrap();

        let embedder = LocalEmbedder::from_config(&config).await.unwrap();
        assert_eq!(embedder.kind(), EmbedderKind::Hashing);

        let strict = KnowledgeConfig {
            fallback_to_hashing: false,
            ..config
        };
        let err = LocalEmbedder::from_config(&strict).await.unwrap_err();
        assert!(err.to_string().contains("tokenizer"), "got {err}");
    }
}
