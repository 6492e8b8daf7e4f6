// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `batsignal logs`: dump one day of the conversation journal.

use std::io::Write;

use batsignal_config::BatsignalConfig;
use batsignal_core::BatsignalError;
use batsignal_journal::ConversationLog;
use chrono::NaiveDate;

/// Writes the records for `date` (today when `None`) to `out`, one JSON
/// object per line. A day without a file prints nothing.
pub fn run_logs(
    config: &BatsignalConfig,
    date: Option<&str>,
    out: &mut impl Write,
) -> Result<(), BatsignalError> {
    let journal = ConversationLog::new(&config.journal.log_dir);
    let records = match date {
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                BatsignalError::Config(format!("invalid date `{raw}` (expected YYYY-MM-DD): {e}"))
            })?;
            journal.read_day(day)?
        }
        None => journal.read_today()?,
    };

    for record in &records {
        let line = record.to_line()?;
        out.write_all(line.as_bytes()).map_err(BatsignalError::storage)?;
    }
    out.flush().map_err(BatsignalError::storage)
}
