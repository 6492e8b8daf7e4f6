// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading the journal back as training data.

use std::path::{Path, PathBuf};

use batsignal_core::BatsignalError;
use tracing::{debug, warn};

use crate::record::{ConversationRecord, TrainingPair};

/// Log files in `dir`, sorted by name (and therefore by day).
///
/// Only regular files with a `.jsonl` extension count. A missing directory
/// has no files.
pub fn log_files(dir: &Path) -> Result<Vec<PathBuf>, BatsignalError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BatsignalError::storage(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(BatsignalError::storage)?;
        let path = entry.path();
        let is_file = entry.file_type().map_err(BatsignalError::storage)?.is_file();
        if is_file && path.extension().is_some_and(|ext| ext == "jsonl") {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-journal entry");
        }
    }
    files.sort();
    Ok(files)
}

/// Parses every record in one log file, in file order.
///
/// Blank lines are skipped. A malformed line that ends in a newline is an
/// error naming its 1-based line number. A malformed final line without a
/// newline is an append still in progress and is skipped.
pub fn read_log_file(path: &Path) -> Result<Vec<ConversationRecord>, BatsignalError> {
    let bytes = std::fs::read(path).map_err(BatsignalError::storage)?;
    let terminated = bytes.last().is_none_or(|b| *b == b'\n');

    let lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
    let last = lines.len().saturating_sub(1);

    let mut records = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match ConversationRecord::from_line(line) {
            Ok(record) => records.push(record),
            Err(_) if index == last && !terminated => {
                debug!(path = %path.display(), line = index + 1, "skipping partial trailing record");
            }
            Err(source) => {
                return Err(BatsignalError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                });
            }
        }
    }
    Ok(records)
}

/// Every record in `dir` as a training pair, ordered by file then line.
pub fn collect_training_pairs(dir: &Path) -> Result<Vec<TrainingPair>, BatsignalError> {
    let mut pairs = Vec::new();
    for file in log_files(dir)? {
        let records = read_log_file(&file)?;
        debug!(path = %file.display(), records = records.len(), "read journal file");
        pairs.extend(records.into_iter().map(TrainingPair::from));
    }
    Ok(pairs)
}

/// Rejects an empty corpus before any training work starts.
pub fn require_non_empty(pairs: Vec<TrainingPair>) -> Result<Vec<TrainingPair>, BatsignalError> {
    if pairs.is_empty() {
        warn!("no conversation records available for training");
        return Err(BatsignalError::EmptyCorpus);
    }
    Ok(pairs)
}
