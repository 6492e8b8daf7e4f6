// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for hosted chat completion APIs.

use async_trait::async_trait;

use crate::error::BatsignalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a remote chat completion API.
///
/// Failures must come back as [`BatsignalError::Provider`] with a kind that
/// distinguishes auth, rate limit, network, and malformed-response cases;
/// an error is never turned into an empty reply.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest)
        -> Result<ProviderResponse, BatsignalError>;
}
