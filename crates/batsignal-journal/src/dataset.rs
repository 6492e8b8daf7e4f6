// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fine-tuning dataset materialization.

use std::io::Write;
use std::path::Path;

use batsignal_core::types::{ChatMessage, DatasetFormat};
use batsignal_core::BatsignalError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::record::TrainingPair;

/// One line of the generated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainingExample {
    /// Causal-LM prompt/completion text.
    Text { text: String },
    /// Chat-format messages: system, user, assistant.
    Chat { messages: Vec<ChatMessage> },
}

impl TrainingExample {
    pub fn text(pair: &TrainingPair) -> Self {
        Self::Text {
            text: format!("User: {}\nAssistant: {}", pair.input, pair.output),
        }
    }

    pub fn chat(pair: &TrainingPair, system_prompt: &str) -> Self {
        Self::Chat {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(pair.input.as_str()),
                ChatMessage::assistant(pair.output.as_str()),
            ],
        }
    }

    pub fn from_pair(pair: &TrainingPair, format: DatasetFormat, system_prompt: &str) -> Self {
        match format {
            DatasetFormat::Text => Self::text(pair),
            DatasetFormat::Chat => Self::chat(pair, system_prompt),
        }
    }
}

/// Writes `pairs` to `path` as JSONL and returns the number of lines.
///
/// The file is assembled next to `path` and renamed into place, so a reader
/// never sees a half-written dataset.
pub fn write_dataset(
    path: &Path,
    pairs: &[TrainingPair],
    format: DatasetFormat,
    system_prompt: &str,
) -> Result<usize, BatsignalError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(BatsignalError::storage)?;
    }

    let mut buf = Vec::new();
    for pair in pairs {
        let example = TrainingExample::from_pair(pair, format, system_prompt);
        serde_json::to_writer(&mut buf, &example)
            .map_err(|e| BatsignalError::Internal(format!("failed to encode example: {e}")))?;
        buf.push(b'\n');
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    let mut file = std::fs::File::create(&tmp_path).map_err(BatsignalError::storage)?;
    file.write_all(&buf)
        .and_then(|()| file.sync_all())
        .map_err(BatsignalError::storage)?;
    drop(file);
    std::fs::rename(&tmp_path, path).map_err(BatsignalError::storage)?;

    info!(path = %path.display(), examples = pairs.len(), ?format, "training dataset written");
    Ok(pairs.len())
}
