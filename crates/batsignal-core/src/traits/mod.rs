// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the chat pipeline and its backends.
//!
//! Every backend implements [`PluginAdapter`] for identity and health, plus
//! one capability trait. The pipeline holds them as `Arc<dyn ...>`, hence
//! `#[async_trait]` rather than native async fns.

pub mod adapter;
pub mod embedding;
pub mod knowledge;
pub mod provider;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use knowledge::KnowledgeAdapter;
pub use provider::ProviderAdapter;
