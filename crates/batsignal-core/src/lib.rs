// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for batsignal.
//!
//! Holds the workspace error type, the adapter traits the chat pipeline is
//! wired through (provider, embedding, knowledge), and the request/response
//! types that flow across them.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BatsignalError, ProviderErrorKind};
pub use types::{AdapterType, DatasetFormat, EmbedderKind, HealthStatus};
pub use traits::{EmbeddingAdapter, KnowledgeAdapter, PluginAdapter, ProviderAdapter};
