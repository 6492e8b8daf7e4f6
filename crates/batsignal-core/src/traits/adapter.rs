// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and health, shared by every backend.

use async_trait::async_trait;

use crate::error::BatsignalError;
use crate::types::{AdapterType, HealthStatus};

#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short stable name used in logs, e.g. `"groq"`.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Cheap liveness check; must not call paid upstream endpoints.
    async fn health_check(&self) -> Result<HealthStatus, BatsignalError>;

    /// Release held resources. Most backends hold none.
    async fn shutdown(&self) -> Result<(), BatsignalError> {
        Ok(())
    }
}
