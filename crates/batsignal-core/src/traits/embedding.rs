// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::BatsignalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Maps text to fixed-length vectors for the knowledge store.
///
/// All vectors from one adapter share `EmbeddingOutput::dimensions`, and
/// `embeddings[i]` belongs to `input.texts[i]`.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, BatsignalError>;
}
