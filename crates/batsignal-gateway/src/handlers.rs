// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use batsignal_agent::Capabilities;
use batsignal_core::{BatsignalError, ProviderErrorKind};
use batsignal_journal::ConversationRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::GatewayState;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Missing means an empty message.
    #[serde(default)]
    pub message: String,
    /// Caller-supplied context stored with the turn.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// Response body for POST /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Provider failure kind, for gateway errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderErrorKind>,
}

/// Query string for GET /view_logs.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// `YYYY-MM-DD` (UTC). Defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent: String,
    pub version: String,
    pub uptime_secs: u64,
    pub capabilities: Capabilities,
}

/// HTTP status for a failed request.
pub fn status_for(err: &BatsignalError) -> StatusCode {
    match err {
        BatsignalError::Provider { .. } => StatusCode::BAD_GATEWAY,
        BatsignalError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &BatsignalError) -> Response {
    let status = status_for(err);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.provider_kind(),
        }),
    )
        .into_response()
}

/// POST /chat
pub async fn post_chat(State(state): State<GatewayState>, Json(body): Json<ChatRequest>) -> Response {
    info!(message_len = body.message.len(), "chat request received");

    match state.pipeline.respond(&body.message, body.context).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ChatResponse {
                response: outcome.reply,
                warnings: outcome.warnings,
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "chat request failed");
            error_response(&e)
        }
    }
}

/// GET /view_logs
pub async fn get_view_logs(
    State(state): State<GatewayState>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let date = match query.date.as_deref().map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d")) {
        None => None,
        Some(Ok(date)) => Some(date),
        Some(Err(e)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("invalid date (expected YYYY-MM-DD): {e}"),
                    kind: None,
                }),
            )
                .into_response();
        }
    };

    let journal = state.pipeline.journal().clone();
    let read = tokio::task::spawn_blocking(move || match date {
        Some(date) => journal.read_day(date),
        None => journal.read_today(),
    })
    .await
    .map_err(|e| BatsignalError::Internal(format!("log read task failed: {e}")))
    .and_then(|r| r);

    match read {
        Ok(records) => Json::<Vec<ConversationRecord>>(records).into_response(),
        Err(e) => {
            error!(error = %e, "failed to read conversation log");
            error_response(&e)
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        agent: state.health.agent_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        capabilities: state.health.capabilities,
    })
}
