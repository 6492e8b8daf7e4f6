// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI-compatible chat completions API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A single message in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

/// Non-streaming response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    /// Absent on some error-shaped successes; treated as malformed.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the provider sent one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_openai_shape() {
        let req = ChatCompletionRequest {
            model: "mixtral-8x7b-32768".into(),
            messages: vec![
                ApiMessage {
                    role: "system".into(),
                    content: "You are Batman.".into(),
                },
                ApiMessage {
                    role: "user".into(),
                    content: "hello".into(),
                },
            ],
            max_tokens: 50,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "mixtral-8x7b-32768");
        assert_eq!(json["max_tokens"], 50);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn response_parses_first_choice() {
        let body = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "mixtral-8x7b-32768",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "I am Batman."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 40, "completion_tokens": 4, "total_tokens": 44}
        });
        let resp: ChatCompletionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.first_content(), Some("I am Batman."));
        assert_eq!(resp.usage.unwrap().completion_tokens, 4);
    }

    #[test]
    fn response_without_content_has_no_text() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant"}}]
        });
        let resp: ChatCompletionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.first_content(), None);
    }

    #[test]
    fn error_envelope_parses() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.error.message, "Invalid API Key");
        assert_eq!(err.error.type_.as_deref(), Some("invalid_request_error"));
    }
}
