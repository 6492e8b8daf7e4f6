// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for batsignal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Why a chat provider call failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Credentials missing or rejected (401/403).
    Auth,
    /// Provider quota or rate limit hit (429).
    RateLimited,
    /// Transport failure before a response arrived.
    Network,
    /// Response body could not be parsed or lacked a message.
    MalformedResponse,
    /// Any other non-success status from the provider.
    Upstream,
    /// The provider answered but produced no text.
    EmptyReply,
}

/// The primary error type used across batsignal crates.
#[derive(Debug, Error)]
pub enum BatsignalError {
    /// Configuration errors (invalid TOML, missing API key, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The conversation journal could not be created, opened, or written.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A journal line failed to parse while materializing training data.
    #[error("malformed record at {}:{line}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    /// The chat provider failed to produce a reply.
    #[error("provider error ({kind}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        status: Option<u16>,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The journal holds no conversations to train on.
    #[error("no training data found; chat with the bot to record conversations first")]
    EmptyCorpus,

    /// Knowledge base store or query failure.
    #[error("knowledge error: {0}")]
    Knowledge(String),

    /// External training routine failed.
    #[error("training error: {0}")]
    Training(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BatsignalError {
    /// Builds a provider error without an underlying source.
    pub fn provider(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        BatsignalError::Provider {
            kind,
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an I/O failure as a storage error.
    pub fn storage(err: std::io::Error) -> Self {
        BatsignalError::Storage {
            source: Box::new(err),
        }
    }

    /// The provider failure kind, if this is a provider error.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            BatsignalError::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_includes_kind() {
        let err = BatsignalError::provider(ProviderErrorKind::RateLimited, "slow down");
        assert_eq!(err.to_string(), "provider error (rate_limited): slow down");
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::RateLimited));
    }

    #[test]
    fn malformed_record_display_names_file_and_line() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = BatsignalError::MalformedRecord {
            path: PathBuf::from("logs/conversations_2026-01-01.jsonl"),
            line: 3,
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("conversations_2026-01-01.jsonl:3"), "got: {msg}");
    }

    #[test]
    fn storage_error_wraps_io() {
        let err = BatsignalError::storage(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
        assert!(err.provider_kind().is_none());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ProviderErrorKind::MalformedResponse).unwrap();
        assert_eq!(json, "\"malformed_response\"");
    }
}
