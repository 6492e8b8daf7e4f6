// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in conversation style snippets.

use batsignal_core::types::SnippetMetadata;

const PERSONA_SNIPPETS: [(&str, &str, &str); 5] = [
    (
        "Talk like a real friend having a casual conversation. Be natural and engaging.",
        "conversation_style",
        "personality",
    ),
    (
        "Use casual, everyday language like 'hey', 'yeah', 'cool', etc. Sound like a real person.",
        "language",
        "personality",
    ),
    (
        "Be empathetic and supportive, like a close friend would be.",
        "empathy",
        "personality",
    ),
    (
        "Keep responses short and natural, as if we're having a real conversation.",
        "length",
        "style",
    ),
    (
        "For greetings, be casual and warm, like 'Hey! How's it going?' or 'Hi there! What's new?'",
        "greeting",
        "style",
    ),
];

/// Snippets stored at startup, each tagged `source = "manual"` with its
/// `type` and `category`.
pub fn persona_seed() -> Vec<(String, SnippetMetadata)> {
    PERSONA_SNIPPETS
        .iter()
        .map(|(text, kind, category)| {
            let mut meta = SnippetMetadata::new();
            meta.insert("source".into(), "manual".into());
            meta.insert("type".into(), (*kind).into());
            meta.insert("category".into(), (*category).into());
            (text.to_string(), meta)
        })
        .collect()
}
