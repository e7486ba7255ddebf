//! OpenAI chat-completions client.
//!
//! Single-turn completion at temperature 0 — the pipeline sends one prompt
//! and expects one HTML answer back.

use async_trait::async_trait;
use common::{Error, Summarizer};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat-completions API client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

/// Response from POST /v1/chat/completions.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, model, timeout_secs, CHAT_COMPLETIONS_URL.to_string())
    }

    /// Construct against a non-default endpoint (used by tests).
    pub fn with_base_url(
        api_key: String,
        model: String,
        timeout_secs: u64,
        base_url: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("weather-api/0.1")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build OpenAI HTTP client");

        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    /// Send one user prompt and return the model's text reply.
    pub async fn chat(&self, prompt: &str) -> Result<String, Error> {
        debug!("Chat completion request: model={}", self.model);

        let payload = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        let resp = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Summarize(format!("HTTP error: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Summarize(format!(
                "OpenAI returned {}: {}",
                status,
                truncate_body(&body, 500)
            )));
        }

        let payload: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| Error::Summarize(format!("JSON parse error: {e}")))?;

        let choice = payload
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Summarize("Response contained no choices".into()))?;

        Ok(choice.message.content)
    }
}

/// Truncate an upstream error body to at most `max` bytes, backing off to
/// the nearest char boundary so multi-byte error messages never split.
fn truncate_body(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, Error> {
        self.chat(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[test]
    fn test_deserialize_completion_response() {
        let parsed: ChatCompletionResponse =
            serde_json::from_value(completion_body("<div>ok</div>"))
                .expect("response should deserialize");

        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(parsed.choices[0].message.content, "<div>ok</div>");
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("สรุปอากาศ")),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiClient::with_base_url("sk-test".into(), "gpt-4o-mini".into(), 5, server.uri());
        let text = client.chat("prompt").await.expect("chat should succeed");
        assert_eq!(text, "สรุปอากาศ");
    }

    #[tokio::test]
    async fn test_chat_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::with_base_url("bad".into(), "gpt-4o-mini".into(), 5, server.uri());
        let err = client.chat("prompt").await.expect_err("should fail");
        assert!(matches!(err, Error::Summarize(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_chat_truncates_long_thai_error_body() {
        let server = MockServer::start().await;
        let thai_body = "ข".repeat(200); // 600 bytes of 3-byte chars
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string(thai_body))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::with_base_url("k".into(), "gpt-4o-mini".into(), 5, server.uri());
        let err = client.chat("prompt").await.expect_err("should fail");
        assert!(matches!(err, Error::Summarize(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains('ข'));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let thai = "ข".repeat(200);
        let truncated = truncate_body(&thai, 500);
        assert_eq!(truncated.len(), 498);
        assert!(truncated.chars().all(|c| c == 'ข'));
        assert_eq!(truncate_body("short", 500), "short");
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::with_base_url("k".into(), "gpt-4o-mini".into(), 5, server.uri());
        let err = client.chat("prompt").await.expect_err("should fail");
        assert!(matches!(err, Error::Summarize(_)));
    }
}
