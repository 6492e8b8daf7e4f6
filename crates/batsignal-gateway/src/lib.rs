// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for batsignal.
//!
//! Routes:
//! - `POST /chat`: one persona reply for `{"message": "..."}`
//! - `GET /view_logs`: a day's journal records (`?date=YYYY-MM-DD`, default today)
//! - `GET /health`: status, version, uptime, capabilities
//! - `GET /`, `/voice`, `/text`, `/static/*`: the browser frontend

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
