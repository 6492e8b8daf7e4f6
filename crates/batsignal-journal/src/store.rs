// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only, day-partitioned conversation log.
//!
//! [`ConversationLog`] is the only writer for its directory. All appends go
//! through one mutex, and each record is written with a single `write_all`
//! on an `O_APPEND` handle, so concurrent callers never interleave lines.
//!
//! Every line in a file is a complete record. A failed append is truncated
//! away, and a file left with an unterminated tail (a crash mid-append) is
//! repaired when it is first opened, before anything new is written.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use batsignal_core::BatsignalError;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::materialize::{self, read_log_file};
use crate::record::{ConversationRecord, TrainingPair};

/// File name of the log for a calendar day. Sorts lexicographically by date.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("conversations_{}.jsonl", date.format("%Y-%m-%d"))
}

/// Handle to the file currently being appended to.
struct OpenDay {
    date: NaiveDate,
    file: File,
}

#[derive(Default)]
struct WriterState {
    open: Option<OpenDay>,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Writer for a directory of per-day JSONL conversation logs.
///
/// The directory and the day's file are created lazily on the first append.
pub struct ConversationLog {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    writer: Mutex<WriterState>,
}

impl std::fmt::Debug for ConversationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLog")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl ConversationLog {
    /// Creates a log rooted at `dir` using the system clock.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    /// Creates a log with an explicit time source.
    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        let dir = dir.into();
        info!(dir = %dir.display(), "conversation log initialized");
        Self {
            dir,
            clock,
            writer: Mutex::new(WriterState::default()),
        }
    }

    /// Directory holding the log files.
    pub fn log_dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for a given day.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(log_file_name(date))
    }

    /// Path of the file the next append would go to.
    pub fn current_log_path(&self) -> PathBuf {
        self.path_for(self.clock.now().date_naive())
    }

    /// Appends one conversation turn and returns the stored record.
    ///
    /// The timestamp is taken under the writer lock and never precedes the
    /// previous one written by this log, even if the clock steps backwards.
    pub fn record(
        &self,
        user_message: &str,
        ai_response: &str,
        context: Option<serde_json::Value>,
    ) -> Result<ConversationRecord, BatsignalError> {
        let mut state = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.now();
        let stamp = match state.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };

        let context = context.filter(|value| !value.is_null());
        let record = ConversationRecord::new(stamp, user_message, ai_response, context);
        let line = record.to_line()?;

        let result = self
            .file_for(&mut state, stamp.date_naive())
            .and_then(|file| append_line(file, line.as_bytes()));

        if let Err(e) = result {
            // Reopen on the next append rather than reuse a handle that failed.
            state.open = None;
            return Err(BatsignalError::storage(e));
        }

        state.last_timestamp = Some(stamp);
        debug!(
            timestamp = %record.timestamp,
            user_len = record.user_message.len(),
            reply_len = record.ai_response.len(),
            "conversation recorded"
        );
        Ok(record)
    }

    /// Returns the append handle for `date`, opening a new file on day change.
    fn file_for<'a>(
        &self,
        state: &'a mut WriterState,
        date: NaiveDate,
    ) -> std::io::Result<&'a mut File> {
        let reuse = state.open.as_ref().is_some_and(|open| open.date == date);
        if !reuse {
            std::fs::create_dir_all(&self.dir)?;
            let path = self.path_for(date);
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(&path)?;
            match repair_tail(&mut file)? {
                TailRepair::Clean => {}
                TailRepair::Terminated => {
                    warn!(path = %path.display(), "terminated a complete record missing its newline");
                }
                TailRepair::Truncated { bytes } => {
                    warn!(path = %path.display(), bytes, "discarded partial record left by an interrupted append");
                }
            }
            debug!(path = %path.display(), "opened conversation log file");
            state.open = Some(OpenDay { date, file });
        }

        match state.open.as_mut() {
            Some(open) => Ok(&mut open.file),
            None => Err(std::io::Error::other("log file handle missing")),
        }
    }

    /// Records logged on `date`. A day with no file yields an empty list.
    pub fn read_day(&self, date: NaiveDate) -> Result<Vec<ConversationRecord>, BatsignalError> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_log_file(&path)
    }

    /// Records logged today.
    pub fn read_today(&self) -> Result<Vec<ConversationRecord>, BatsignalError> {
        self.read_day(self.clock.now().date_naive())
    }

    /// Training pairs for every record in the log directory.
    pub fn training_pairs(&self) -> Result<Vec<TrainingPair>, BatsignalError> {
        materialize::collect_training_pairs(&self.dir)
    }
}

/// Writes one full line, or leaves the file as it was.
fn append_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    let start = file.metadata()?.len();
    let written = file.write_all(line).and_then(|()| file.flush());
    if let Err(e) = written {
        if let Err(undo) = file.set_len(start) {
            // The tail is repaired when the file is next opened.
            warn!(error = %undo, "could not truncate failed append");
        }
        return Err(e);
    }
    Ok(())
}

/// What [`repair_tail`] did to a file's final line.
#[derive(Debug, PartialEq, Eq)]
enum TailRepair {
    /// Empty, or already ends in a newline.
    Clean,
    /// The unterminated tail was a whole record; a newline was added.
    Terminated,
    /// The unterminated tail did not parse and was cut off.
    Truncated { bytes: u64 },
}

/// Makes sure the next append starts on a fresh line.
fn repair_tail(file: &mut File) -> std::io::Result<TailRepair> {
    const CHUNK: u64 = 4096;

    let len = file.metadata()?.len();
    let mut line_start = 0;
    let mut end = len;
    let mut buf = vec![0u8; CHUNK as usize];
    while end > 0 {
        let start = end.saturating_sub(CHUNK);
        let chunk = &mut buf[..(end - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(chunk)?;
        if let Some(pos) = chunk.iter().rposition(|b| *b == b'\n') {
            line_start = start + pos as u64 + 1;
            break;
        }
        end = start;
    }

    if line_start == len {
        return Ok(TailRepair::Clean);
    }

    let mut tail = Vec::new();
    file.seek(SeekFrom::Start(line_start))?;
    file.read_to_end(&mut tail)?;
    if ConversationRecord::from_line(&tail).is_ok() {
        file.write_all(b"\n")?;
        file.flush()?;
        return Ok(TailRepair::Terminated);
    }

    file.set_len(line_start)?;
    Ok(TailRepair::Truncated {
        bytes: len - line_start,
    })
}
