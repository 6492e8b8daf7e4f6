// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optional features the running service has available.

use std::path::Path;

use batsignal_core::EmbedderKind;
use serde::Serialize;
use tracing::{debug, info};

/// What this process can do beyond plain remote chat.
///
/// Reported at startup and on `/health`, so a missing knowledge base or
/// fine-tuned model is visible instead of silently absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Replies are grounded with knowledge snippets.
    pub knowledge: bool,
    /// Embedder behind the knowledge base; `hashing` after an ONNX fallback.
    pub embedder: Option<EmbedderKind>,
    /// Fine-tuned model artifacts exist in `training.output_dir`.
    /// Chat still goes to the remote provider either way.
    pub trained_model: bool,
}

/// Whether `dir` holds a saved fine-tuned model (a `config.json` inside it).
pub fn detect_trained_model(dir: &Path) -> bool {
    let found = dir.join("config.json").is_file();
    if found {
        info!(
            path = %dir.display(),
            "fine-tuned model artifacts found; chat continues to use the remote provider"
        );
    } else {
        debug!(path = %dir.display(), "no fine-tuned model artifacts");
    }
    found
}
