// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use batsignal_config::diagnostic::ConfigError;
use batsignal_config::model::{BatsignalConfig, DatasetFormat, EmbedderKind};
use batsignal_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
name = "dark-knight"
log_level = "debug"

[groq]
api_key = "gsk_123"
model = "llama3-8b-8192"
max_tokens = 80
temperature = 0.2
request_timeout_secs = 10
max_retries = 2

[journal]
log_dir = "/tmp/cave"

[knowledge]
enabled = false
max_results = 5

[gateway]
host = "0.0.0.0"
port = 8080

[training]
format = "chat"
epochs = 1
command = ["python", "finetune.py"]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "dark-knight");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.groq.api_key.as_deref(), Some("gsk_123"));
    assert_eq!(config.groq.model, "llama3-8b-8192");
    assert_eq!(config.groq.max_tokens, 80);
    assert_eq!(config.groq.request_timeout_secs, 10);
    assert_eq!(config.groq.max_retries, 2);
    assert_eq!(config.journal.log_dir, "/tmp/cave");
    assert!(!config.knowledge.enabled);
    assert_eq!(config.knowledge.max_results, 5);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.training.format, DatasetFormat::Chat);
    assert_eq!(config.training.epochs, 1);
    assert_eq!(
        config.training.command,
        Some(vec!["python".to_string(), "finetune.py".to_string()])
    );
}

#[test]
fn empty_toml_uses_reference_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "batman");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.groq.api_key.is_none());
    assert_eq!(config.groq.model, "mixtral-8x7b-32768");
    assert_eq!(config.groq.max_tokens, 50);
    assert!((config.groq.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.groq.max_retries, 0);
    assert_eq!(config.journal.log_dir, "conversation_logs");
    assert!(config.knowledge.enabled);
    assert_eq!(config.knowledge.max_results, 3);
    assert_eq!(config.knowledge.embedder, EmbedderKind::Onnx);
    assert!(config.knowledge.fallback_to_hashing);
    assert_eq!(config.groq.retry_backoff_ms, 500);
    assert_eq!(config.gateway.port, 5001);
    assert_eq!(config.training.base_model, "mistralai/Mistral-7B-v0.1");
    assert_eq!(config.training.output_dir, "./trained_model");
    assert_eq!(config.training.epochs, 3);
    assert_eq!(config.training.batch_size, 4);
    assert_eq!(config.training.max_length, 512);
    assert_eq!(config.training.format, DatasetFormat::Text);
    assert!(config.training.command.is_none());
}

#[test]
fn unknown_field_in_groq_is_rejected() {
    let toml = r#"
[groq]
modle = "x"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("modle"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;

    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: BatsignalConfig = Figment::new()
        .merge(Serialized::defaults(BatsignalConfig::default()))
        .merge(Toml::string("[groq]\napi_key = \"from-toml\"\n"))
        .merge(("groq.api_key", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.groq.api_key.as_deref(), Some("from-env"));
}

#[test]
fn missing_config_file_is_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: BatsignalConfig = Figment::new()
        .merge(Serialized::defaults(BatsignalConfig::default()))
        .merge(Toml::file("/nonexistent/path/batsignal.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "batman");
}

#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = r#"
[agent]
naem = "robin"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "naem"
                && suggestion.as_deref() == Some("name")
                && valid_keys.contains("log_level")
        })
    });
    assert!(found, "expected UnknownKey for `naem`, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[gateway]
port = "five thousand"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("port"),
        "got: {err_str}"
    );
}

#[test]
fn validation_catches_zero_timeout() {
    let toml = r#"
[groq]
request_timeout_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero timeout should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("request_timeout_secs"))
    }));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `name`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("naem"));
}

#[test]
fn shipped_example_config_is_valid() {
    let example = include_str!("../../../batsignal.example.toml");
    let config = load_and_validate_str(example).expect("example config should validate");
    let defaults = BatsignalConfig::default();

    assert_eq!(config.groq.model, defaults.groq.model);
    assert_eq!(config.training.format, DatasetFormat::Text);
    assert!(config.training.command.is_none());
}

#[test]
fn hashing_embedder_can_be_selected() {
    let config = load_config_from_str(
        r#"
[knowledge]
embedder = "hashing"
download_model = false
"#,
    )
    .unwrap();
    assert_eq!(config.knowledge.embedder, EmbedderKind::Hashing);
    assert!(!config.knowledge.download_model);
}
