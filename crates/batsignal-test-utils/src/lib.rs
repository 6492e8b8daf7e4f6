// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for batsignal.
//!
//! Deterministic stand-ins for the external adapters so pipeline and HTTP
//! tests run without network access.
//!
//! - [`MockProvider`]: scripted chat replies or failures
//! - [`StaticKnowledge`]: fixed snippets for every query
//! - [`FailingKnowledge`]: a knowledge base whose queries always fail

pub mod mock_knowledge;
pub mod mock_provider;

pub use mock_knowledge::{FailingKnowledge, StaticKnowledge};
pub use mock_provider::{MockProvider, MockReply};
