// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    Knowledge,
}

// --- Provider types ---

/// A single chat message in a provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A request to a chat completion provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Model identifier; `None` uses the provider's default.
    pub model: Option<String>,
    /// Persona instruction sent as the system message.
    pub system_prompt: String,
    /// Conversation turns after the system message.
    pub messages: Vec<ChatMessage>,
    /// Response length cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A completed response from a chat provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Provider-assigned response ID.
    pub id: String,
    /// Assistant text.
    pub content: String,
    /// Model that produced the response.
    pub model: String,
    /// Why generation stopped ("stop", "length", ...).
    pub finish_reason: Option<String>,
    /// Token usage, when reported.
    pub usage: TokenUsage,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    /// Texts to embed.
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// Dimensionality of each vector.
    pub dimensions: usize,
}

/// Which local embedder backs the knowledge base.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmbedderKind {
    /// Sentence-transformer model run through ONNX Runtime.
    #[default]
    Onnx,
    /// Feature hashing over word and character n-grams; needs no model.
    Hashing,
}

// --- Knowledge types ---

/// Free-form metadata attached to a stored snippet.
pub type SnippetMetadata = serde_json::Map<String, serde_json::Value>;

/// A stored snippet returned by a knowledge query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    /// Store-assigned identifier.
    pub id: String,
    /// Snippet text.
    pub text: String,
    /// Metadata supplied at store time.
    pub metadata: SnippetMetadata,
    /// Relevance score for this query (higher is better).
    pub score: f32,
}

// --- Training types ---

/// Layout of each line in a materialized training dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatasetFormat {
    /// `{"text": "User: ...\nAssistant: ..."}`
    #[default]
    Text,
    /// `{"messages": [system, user, assistant]}`
    Chat,
}
