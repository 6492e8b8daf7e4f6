// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{BatsignalConfig, EmbedderKind};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &BatsignalConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if config.journal.log_dir.trim().is_empty() {
        fail("journal.log_dir must not be empty".to_string());
    }

    if config.groq.base_url.trim().is_empty() {
        fail("groq.base_url must not be empty".to_string());
    }

    if config.groq.max_tokens == 0 {
        fail("groq.max_tokens must be at least 1".to_string());
    }

    if !(0.0..=2.0).contains(&config.groq.temperature) {
        fail(format!(
            "groq.temperature must be between 0.0 and 2.0, got {}",
            config.groq.temperature
        ));
    }

    if config.groq.request_timeout_secs == 0 {
        fail("groq.request_timeout_secs must be at least 1".to_string());
    }

    if config.knowledge.max_results == 0 {
        fail("knowledge.max_results must be at least 1".to_string());
    }

    if config.knowledge.embedder == EmbedderKind::Onnx && config.knowledge.model_dir.trim().is_empty() {
        fail("knowledge.model_dir must not be empty when knowledge.embedder = \"onnx\"".to_string());
    }

    if config.knowledge.dimensions < 8 {
        fail(format!(
            "knowledge.dimensions must be at least 8, got {}",
            config.knowledge.dimensions
        ));
    }

    let training = &config.training;
    for (key, value) in [
        ("epochs", training.epochs),
        ("batch_size", training.batch_size),
        ("max_length", training.max_length),
    ] {
        if value == 0 {
            fail(format!("training.{key} must be at least 1"));
        }
    }

    if let Some(command) = &training.command {
        if command.first().is_none_or(|program| program.trim().is_empty()) {
            fail("training.command must start with a program name".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&BatsignalConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = BatsignalConfig::default();
        config.groq.max_tokens = 0;
        config.groq.temperature = 3.5;
        config.journal.log_dir = "  ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "got: {errors:?}");
    }

    #[test]
    fn rejects_empty_training_command() {
        let mut config = BatsignalConfig::default();
        config.training.command = Some(vec![]);
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigError::Validation { message } if message.contains("training.command")
        ));
    }

    #[test]
    fn onnx_embedder_needs_a_model_dir() {
        let mut config = BatsignalConfig::default();
        config.knowledge.model_dir = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigError::Validation { message } if message.contains("knowledge.model_dir")
        ));

        config.knowledge.embedder = EmbedderKind::Hashing;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_garbage_host() {
        let mut config = BatsignalConfig::default();
        config.gateway.host = "not a host!".to_string();
        assert!(validate_config(&config).is_err());
    }
}
