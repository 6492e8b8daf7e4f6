// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector helpers and snippet metadata defaults.

use batsignal_core::types::SnippetMetadata;

/// Metadata attached to snippets stored without any.
pub fn default_metadata() -> SnippetMetadata {
    let mut meta = SnippetMetadata::new();
    meta.insert("source".into(), "default".into());
    meta.insert("type".into(), "general_knowledge".into());
    meta
}

/// Cosine similarity of two vectors.
///
/// Mismatched lengths and zero vectors score `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// L2-normalize a vector in place. Zero vectors are left unchanged.
pub fn l2_normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}
