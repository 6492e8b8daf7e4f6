// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sentence embeddings from all-MiniLM-L6-v2 run through ONNX Runtime.
//!
//! Inference is CPU-only and single-threaded. Token vectors are mean-pooled
//! over the attention mask and L2-normalized, giving 384-wide unit vectors.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use batsignal_core::error::BatsignalError;
use batsignal_core::traits::{EmbeddingAdapter, PluginAdapter};
use batsignal_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::{Tokenizer, TruncationParams};

use crate::model_manager::{MODEL_FILE, TOKENIZER_FILE};
use crate::types::l2_normalize;

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Longer inputs are truncated to this many tokens.
const MAX_TOKENS: usize = 256;

fn knowledge_err(context: &str, err: impl std::fmt::Display) -> BatsignalError {
    BatsignalError::Knowledge(format!("{context}: {err}"))
}

pub struct OnnxEmbedder {
    /// `Session::run` needs `&mut`.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

// SAFETY: the session is only reached through the mutex, and tokenizer
// encoding takes `&self` without interior mutation.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl std::fmt::Debug for OnnxEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbedder").finish_non_exhaustive()
    }
}

impl OnnxEmbedder {
    /// Loads `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, BatsignalError> {
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            knowledge_err(&format!("failed to load tokenizer {}", tokenizer_path.display()), e)
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..TruncationParams::default()
            }))
            .map_err(|e| knowledge_err("failed to configure truncation", e))?;

        let model_path = model_dir.join(MODEL_FILE);
        let session = Session::builder()
            .map_err(|e| knowledge_err("failed to create ONNX session builder", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| knowledge_err("failed to set optimization level", e))?
            .with_intra_threads(1)
            .map_err(|e| knowledge_err("failed to set thread count", e))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                knowledge_err(&format!("failed to load ONNX model {}", model_path.display()), e)
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embeds one text into a unit vector of [`EMBEDDING_DIM`] floats.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, BatsignalError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| knowledge_err("tokenization failed", e))?;

        let widen = |v: &[u32]| v.iter().map(|&x| i64::from(x)).collect::<Vec<i64>>();
        let input_ids = widen(encoding.get_ids());
        let attention_mask = widen(encoding.get_attention_mask());
        let token_type_ids = widen(encoding.get_type_ids());
        let seq_len = input_ids.len();

        let shaped = |name: &str, v: Vec<i64>| {
            Array2::from_shape_vec((1, seq_len), v)
                .map_err(|e| knowledge_err(&format!("bad {name} shape"), e))
        };
        let input_ids = shaped("input_ids", input_ids)?;
        let mask = shaped("attention_mask", attention_mask.clone())?;
        let token_type_ids = shaped("token_type_ids", token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| knowledge_err("ONNX session lock poisoned", e))?;

        let ids_tensor = TensorRef::from_array_view(&input_ids)
            .map_err(|e| knowledge_err("bad input_ids tensor", e))?;
        let mask_tensor = TensorRef::from_array_view(&mask)
            .map_err(|e| knowledge_err("bad attention_mask tensor", e))?;
        let types_tensor = TensorRef::from_array_view(&token_type_ids)
            .map_err(|e| knowledge_err("bad token_type_ids tensor", e))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => types_tensor
            ])
            .map_err(|e| knowledge_err("ONNX inference failed", e))?;

        // [1, seq_len, hidden]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| knowledge_err("failed to read output tensor", e))?;
        let hidden = shape[shape.len() - 1] as usize;

        let mut pooled = mean_pool(data, &attention_mask, seq_len, hidden);
        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}

/// Averages the token vectors whose mask entry is set.
fn mean_pool(tokens: &[f32], mask: &[i64], seq_len: usize, hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden];
    let mut count = 0.0f32;

    for (i, _) in mask.iter().enumerate().take(seq_len).filter(|(_, m)| **m > 0) {
        let row = &tokens[i * hidden..(i + 1) * hidden];
        for (acc, v) in sum.iter_mut().zip(row) {
            *acc += v;
        }
        count += 1.0;
    }

    if count > 0.0 {
        for v in &mut sum {
            *v /= count;
        }
    }
    sum
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("session lock poisoned: {e}"))),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, BatsignalError> {
        let embeddings = input
            .texts
            .iter()
            .map(|text| self.embed_text(text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: EMBEDDING_DIM,
        })
    }
}
