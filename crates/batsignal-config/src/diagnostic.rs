// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Turns figment extraction failures into [`ConfigError`] diagnostics that
//! point at the offending key in the TOML source and suggest the closest
//! valid key name.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic context.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no config struct declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(batsignal::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(batsignal::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required key is absent.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(batsignal::config::missing_key),
        help("add `{key} = <value>` to batsignal.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(batsignal::config::validation))]
    Validation { message: String },

    /// Anything figment reports that the variants above do not cover.
    #[error("configuration error: {0}")]
    #[diagnostic(code(batsignal::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error inside a `figment::Error` into a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs used to attach source spans
/// to unknown-key errors.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let suggestion = suggest_key(field, expected);
                let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
                let (span, src) = origin_of(&error, toml_sources)
                    .and_then(|(path, content)| {
                        find_key_offset(content, &section, field).map(|offset| {
                            (
                                Some(SourceSpan::new(offset.into(), field.len())),
                                Some(NamedSource::new(path, content.to_string())),
                            )
                        })
                    })
                    .unwrap_or((None, None));

                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion,
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error
                    .path
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// The TOML source an error was read from, when it came from a known file.
fn origin_of<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    toml_sources
        .iter()
        .find(|(path, _)| origin.as_deref() == Some(path.as_str()))
        .or_else(|| toml_sources.iter().find(|(path, _)| path == "<inline>"))
        .map(|(path, content)| (path.as_str(), content.as_str()))
}

/// Byte offset of `field` inside the `[section]` table named by `path`.
///
/// Tracks the current table header while scanning, so a key with the same
/// name in an earlier or later table is not matched. An empty `path` means
/// top-level keys before the first header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.join(".");
    let mut current = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            current = header
                .trim_start_matches('[')
                .split(']')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
        } else if current == wanted {
            if let Some(after) = trimmed.strip_prefix(field) {
                if after.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }

        offset += line.len();
    }

    None
}

/// Best valid key for an unknown one, by Jaro-Winkler similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_name_for_transposed_letters() {
        let valid = &["name", "log_level", "system_prompt", "system_prompt_file"];
        assert_eq!(suggest_key("naem", valid), Some("name".to_string()));
    }

    #[test]
    fn suggests_max_tokens_for_typo() {
        let valid = &["api_key", "base_url", "model", "max_tokens", "temperature"];
        assert_eq!(suggest_key("max_tokns", valid), Some("max_tokens".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn key_offset_respects_section() {
        let content = "[gateway]\nport = 1\n[groq]\nmodle = \"x\"\n";
        let offset = find_key_offset(content, &["groq".to_string()], "modle").unwrap();
        assert_eq!(&content[offset..offset + 5], "modle");
    }

    #[test]
    fn key_offset_skips_same_key_in_other_section() {
        let content = "[agent]\nname = \"a\"\n[training]\n  name = \"b\"\n";
        let offset = find_key_offset(content, &["training".to_string()], "name").unwrap();
        assert_eq!(&content[offset..offset + 10], "name = \"b\"");
    }

    #[test]
    fn key_offset_requires_assignment() {
        let content = "[agent]\nnamespace = 1\n";
        assert!(find_key_offset(content, &["agent".to_string()], "name").is_none());
    }
}
