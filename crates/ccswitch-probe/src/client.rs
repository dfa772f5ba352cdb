//! HTTP probe client
//!
//! Mimics the Claude CLI's request shape so proxies that filter on it
//! accept the probe.

use async_trait::async_trait;
use ccswitch_core::profile::{ProbeResult, Profile, TestStatus};
use ccswitch_core::util::truncate_chars;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::ProbeError;

pub const DEFAULT_QUESTION: &str = "1+2=?";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const CLIENT_USER_AGENT: &str = "claude-cli/1.0.115 (external, cli)";
pub const MAX_TOKENS: u32 = 100;

/// Characters of the answer kept in a passed probe's message
const ANSWER_PREVIEW_CHARS: usize = 30;

/// Cap on any recorded message
const MAX_MESSAGE_CHARS: usize = 200;

const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Anything that can probe a profile
///
/// Implementations never fail: every outcome is classified into a
/// [`ProbeResult`].
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn probe(&self, profile: &Profile, question: &str) -> ProbeResult;
}

/// Probe client talking to `{base_url}/v1/messages`
#[derive(Debug, Clone)]
pub struct HttpProbeClient {
    http: reqwest::Client,
}

impl HttpProbeClient {
    /// Build a client whose requests give up after `timeout`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self { http })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Endpoint for a base URL, tolerating a trailing slash
#[must_use]
pub fn messages_url(base_url: &str) -> String {
    format!("{}/v1/messages", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn probe(&self, profile: &Profile, question: &str) -> ProbeResult {
        let url = messages_url(&profile.base_url);
        debug!(profile = %profile.name, %url, model = %profile.default_model, "sending probe");

        let body = MessagesRequest {
            model: &profile.default_model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: question,
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("x-api-key", &profile.auth_token)
            .json(&body)
            .send()
            .await;

        let result = match response {
            Ok(response) => classify_response(response, question).await,
            Err(e) => transport_failure(&e),
        };
        debug!(profile = %profile.name, status = %result.status, "probe finished");
        result
    }
}

async fn classify_response(response: reqwest::Response, question: &str) -> ProbeResult {
    let status = response.status();
    if status == StatusCode::OK {
        return match response.json::<MessagesResponse>().await {
            Ok(body) => match body.content.into_iter().next().and_then(|b| b.text) {
                Some(answer) => passed(question, answer),
                None => error("Response contained no answer text"),
            },
            Err(e) => transport_failure(&e),
        };
    }

    let fallback = format!("HTTP {}", status.as_u16());
    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback),
        Err(_) => fallback,
    };
    ProbeResult::now(
        TestStatus::Failed,
        truncate_chars(&message, MAX_MESSAGE_CHARS),
        None,
    )
}

fn passed(question: &str, answer: String) -> ProbeResult {
    let preview: String = answer.chars().take(ANSWER_PREVIEW_CHARS).collect();
    let message = format!("Q:{question} A:{preview}...");
    ProbeResult::now(
        TestStatus::Passed,
        truncate_chars(&message, MAX_MESSAGE_CHARS),
        Some(answer),
    )
}

fn transport_failure(err: &reqwest::Error) -> ProbeResult {
    if err.is_timeout() {
        ProbeResult::now(TestStatus::Timeout, TIMEOUT_MESSAGE, None)
    } else {
        error(&err.to_string())
    }
}

fn error(message: &str) -> ProbeResult {
    ProbeResult::now(
        TestStatus::Error,
        truncate_chars(message, MAX_MESSAGE_CHARS),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_trailing_slash() {
        assert_eq!(
            messages_url("https://api.example.com/"),
            "https://api.example.com/v1/messages"
        );
        assert_eq!(
            messages_url("https://proxy.example.com/anthropic"),
            "https://proxy.example.com/anthropic/v1/messages"
        );
    }

    #[test]
    fn test_passed_message_preview() {
        let answer = "x".repeat(50);
        let result = passed("hi", answer.clone());
        assert_eq!(result.status, TestStatus::Passed);
        assert_eq!(result.message, format!("Q:hi A:{}...", "x".repeat(30)));
        assert_eq!(result.answer, Some(answer));
    }

    #[test]
    fn test_error_message_capped() {
        let result = error(&"e".repeat(500));
        assert_eq!(result.status, TestStatus::Error);
        assert_eq!(result.message.chars().count(), MAX_MESSAGE_CHARS + 3);
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-sonnet",
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: "1+2=?",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "claude-sonnet",
                "max_tokens": 100,
                "messages": [{"role": "user", "content": "1+2=?"}]
            })
        );
    }
}
