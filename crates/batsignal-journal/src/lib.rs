// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation journal for batsignal.
//!
//! Every chat turn is appended as one JSON line to a per-day file
//! (`conversations_YYYY-MM-DD.jsonl`). Files are never rewritten, so the
//! directory is an append-only ledger that the offline trainer reads back
//! as input/output pairs.
//!
//! - [`ConversationLog`]: the single writer for a log directory
//! - [`collect_training_pairs`]: flattens every log file into [`TrainingPair`]s
//! - [`write_dataset`]: materializes pairs as a fine-tuning dataset

pub mod clock;
pub mod dataset;
pub mod materialize;
pub mod record;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use dataset::{write_dataset, TrainingExample};
pub use materialize::{collect_training_pairs, log_files, read_log_file, require_non_empty};
pub use record::{ConversationRecord, TrainingPair};
pub use store::{log_file_name, ConversationLog};
