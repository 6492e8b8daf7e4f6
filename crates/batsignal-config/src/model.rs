// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use batsignal_core::types::{DatasetFormat, EmbedderKind};

/// Top-level batsignal configuration.
///
/// All sections are optional and default to the values the service ships with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatsignalConfig {
    /// Persona and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Groq (OpenAI-compatible) chat completion settings.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Conversation journal settings.
    #[serde(default)]
    pub journal: JournalConfig,

    /// Knowledge base settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Offline fine-tuning settings.
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Persona identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Persona name, used in logs and the health endpoint.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "batman".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Groq chat completion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroqConfig {
    /// API key. `None` falls back to the `GROQ_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on one HTTP attempt, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra attempts on timeouts and transient statuses (429, 5xx).
    /// 0 disables retry.
    #[serde(default)]
    pub max_retries: u32,

    /// Backoff unit between retries; retry `n` waits `n` units.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl GroqConfig {
    /// Per-attempt HTTP timeout.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Deadline for a whole call: every attempt timing out, every backoff
    /// sleep, plus one second of slack. Always longer than one attempt.
    pub fn call_budget(&self) -> Duration {
        let retries = self.max_retries;
        let attempts = self.attempt_timeout().saturating_mul(retries.saturating_add(1));
        let steps = (u64::from(retries) * (u64::from(retries) + 1) / 2).min(u64::from(u32::MAX));
        let sleeps = self.retry_backoff().saturating_mul(steps as u32);
        attempts
            .saturating_add(sleeps)
            .saturating_add(Duration::from_secs(1))
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

fn default_max_tokens() -> u32 {
    50
}

fn default_temperature() -> f32 {
    0.7
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Conversation journal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    /// Directory holding the per-day JSONL files.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> String {
    "conversation_logs".to_string()
}

/// Knowledge base configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Query the knowledge base before each chat call.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Snippets retrieved per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Embedding backend: `onnx` (all-MiniLM-L6-v2) or `hashing`.
    #[serde(default)]
    pub embedder: EmbedderKind,

    /// Directory holding `model.onnx` and `tokenizer.json`.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Fetch the ONNX model into `model_dir` when it is missing.
    #[serde(default = "default_true")]
    pub download_model: bool,

    /// Use the hashing embedder when the ONNX model cannot be loaded.
    #[serde(default = "default_true")]
    pub fallback_to_hashing: bool,

    /// Embedding vector size for the hashing embedder.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Store the built-in conversation style snippets at startup.
    #[serde(default = "default_true")]
    pub seed_persona: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results: default_max_results(),
            embedder: EmbedderKind::default(),
            model_dir: default_model_dir(),
            download_model: true,
            fallback_to_hashing: true,
            dimensions: default_dimensions(),
            seed_persona: true,
        }
    }
}

fn default_model_dir() -> String {
    "models/all-MiniLM-L6-v2".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> usize {
    3
}

fn default_dimensions() -> usize {
    256
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with `voice.html`, `text.html`, and static assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_static_dir() -> String {
    "static".to_string()
}

/// Offline fine-tuning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    /// Causal language model to fine-tune.
    #[serde(default = "default_base_model")]
    pub base_model: String,

    /// Where the trainer saves the fine-tuned model.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Where the materialized dataset is written.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Dataset line layout.
    #[serde(default)]
    pub format: DatasetFormat,

    /// System message used by the `chat` dataset format.
    #[serde(default = "default_training_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_epochs")]
    pub epochs: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_save_steps")]
    pub save_steps: u32,

    #[serde(default = "default_save_total_limit")]
    pub save_total_limit: u32,

    #[serde(default = "default_logging_steps")]
    pub logging_steps: u32,

    /// Token truncation length handed to the trainer.
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Argv of the external training routine. `None` only writes the dataset.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base_model: default_base_model(),
            output_dir: default_output_dir(),
            dataset_path: default_dataset_path(),
            format: DatasetFormat::default(),
            system_prompt: default_training_system_prompt(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            save_steps: default_save_steps(),
            save_total_limit: default_save_total_limit(),
            logging_steps: default_logging_steps(),
            max_length: default_max_length(),
            command: None,
        }
    }
}

fn default_base_model() -> String {
    "mistralai/Mistral-7B-v0.1".to_string()
}

fn default_output_dir() -> String {
    "./trained_model".to_string()
}

fn default_dataset_path() -> String {
    "./training_data.jsonl".to_string()
}

fn default_training_system_prompt() -> String {
    "You are Batman, the Dark Knight of Gotham.".to_string()
}

fn default_epochs() -> u32 {
    3
}

fn default_batch_size() -> u32 {
    4
}

fn default_save_steps() -> u32 {
    100
}

fn default_save_total_limit() -> u32 {
    2
}

fn default_logging_steps() -> u32 {
    10
}

fn default_max_length() -> u32 {
    512
}

impl BatsignalConfig {
    /// Renders the config as TOML with the API key masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut copy = self.clone();
        if copy.groq.api_key.is_some() {
            copy.groq.api_key = Some("[redacted]".to_string());
        }
        toml::to_string_pretty(&copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_toml_hides_api_key() {
        let mut config = BatsignalConfig::default();
        config.groq.api_key = Some("gsk_secret".to_string());
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn call_budget_outlasts_every_attempt() {
        let mut groq = GroqConfig::default();
        assert_eq!(groq.call_budget(), Duration::from_secs(31));

        groq.request_timeout_secs = 10;
        groq.max_retries = 2;
        groq.retry_backoff_ms = 500;
        // 3 attempts, then 0.5s + 1s of backoff, then slack.
        assert_eq!(groq.call_budget(), Duration::from_millis(32_500));
        assert!(groq.call_budget() > groq.attempt_timeout());
    }

    #[test]
    fn call_budget_saturates() {
        let groq = GroqConfig {
            request_timeout_secs: u64::MAX,
            max_retries: u32::MAX,
            ..GroqConfig::default()
        };
        assert_eq!(groq.call_budget(), Duration::MAX);
    }

    #[test]
    fn dataset_format_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrap {
            format: DatasetFormat,
        }
        let w: Wrap = toml::from_str("format = \"chat\"").unwrap();
        assert_eq!(w.format, DatasetFormat::Chat);
    }
}
