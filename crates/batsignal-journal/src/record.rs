// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journal record types.

use batsignal_core::BatsignalError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One logged chat turn, stored as a single JSON line.
///
/// Serializes with exactly four fields; `context` is written as `null` when
/// absent. Unknown fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// RFC 3339 UTC timestamp taken at write time.
    pub timestamp: String,
    pub user_message: String,
    pub ai_response: String,
    /// Retrieval context supplied by the caller, if any.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

impl ConversationRecord {
    pub fn new(
        at: DateTime<Utc>,
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
        context: Option<serde_json::Value>,
    ) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
            user_message: user_message.into(),
            ai_response: ai_response.into(),
            context,
        }
    }

    /// Serializes the record as one newline-terminated line.
    ///
    /// JSON string escaping guarantees embedded newlines never split the line.
    pub fn to_line(&self) -> Result<String, BatsignalError> {
        let mut line = serde_json::to_string(self)
            .map_err(|e| BatsignalError::Internal(format!("failed to encode record: {e}")))?;
        line.push('\n');
        Ok(line)
    }

    /// Parses a single journal line.
    pub fn from_line(line: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(line)
    }

    /// Drops the context and keeps the input/output pair.
    pub fn to_training_pair(&self) -> TrainingPair {
        TrainingPair {
            input: self.user_message.clone(),
            output: self.ai_response.clone(),
        }
    }
}

/// A supervised fine-tuning example derived from a [`ConversationRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub input: String,
    pub output: String,
}

impl From<ConversationRecord> for TrainingPair {
    fn from(record: ConversationRecord) -> Self {
        Self {
            input: record.user_message,
            output: record.ai_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 22, 15, 0).unwrap()
    }

    #[test]
    fn line_has_exactly_four_fields() {
        let record = ConversationRecord::new(at(), "hi", "I am Batman.", None);
        let line = record.to_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["timestamp"], "2026-03-01T22:15:00.000000Z");
        assert!(obj["context"].is_null());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let line = br#"{"timestamp":"t","user_message":"u","ai_response":"a","context":null,"mood":"grim"}"#;
        let record = ConversationRecord::from_line(line).unwrap();
        assert_eq!(record.user_message, "u");
        assert!(record.context.is_none());
    }

    #[test]
    fn missing_context_reads_as_none() {
        let line = br#"{"timestamp":"t","user_message":"u","ai_response":"a"}"#;
        let record = ConversationRecord::from_line(line).unwrap();
        assert!(record.context.is_none());
    }

    #[test]
    fn training_pair_drops_context() {
        let record = ConversationRecord::new(
            at(),
            "who are you",
            "The night calls.",
            Some(serde_json::json!(["snippet"])),
        );
        let pair = record.to_training_pair();
        assert_eq!(pair.input, "who are you");
        assert_eq!(pair.output, "The night calls.");
    }

    proptest! {
        #[test]
        fn any_text_survives_a_line(user in any::<String>(), reply in any::<String>(), with_ctx in any::<bool>()) {
            let context = with_ctx.then(|| serde_json::json!({"snippets": [user.clone()]}));
            let record = ConversationRecord::new(at(), user, reply, context);
            let line = record.to_line().unwrap();

            prop_assert_eq!(line.matches('\n').count(), 1);
            let parsed = ConversationRecord::from_line(line.trim_end_matches('\n').as_bytes()).unwrap();
            prop_assert_eq!(parsed, record);
        }
    }
}
