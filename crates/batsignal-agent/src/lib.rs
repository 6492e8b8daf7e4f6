// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat pipeline for batsignal.
//!
//! [`ChatPipeline`] turns one user message into one persona reply:
//! optional knowledge lookup, a bounded provider call, then a journal
//! append. Journal and knowledge failures never fail the reply; they come
//! back as warnings on the [`ChatOutcome`].

pub mod capabilities;
pub mod pipeline;
pub mod shutdown;

pub use capabilities::{detect_trained_model, Capabilities};
pub use pipeline::{ChatOutcome, ChatPipeline, PipelineSettings};
pub use shutdown::install_signal_handler;
