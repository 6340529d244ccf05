//! Vision-capable language model client
//!
//! Submits one image plus instruction text to an OpenAI-compatible chat
//! completions endpoint and returns the reply text. One attempt per call;
//! the only bound on waiting is the HTTP client timeout.

use async_trait::async_trait;
use cleancheck_common::config::VisionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("CleanCheck/", env!("CARGO_PKG_VERSION"));

/// Vision client errors
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Vision provider API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Vision provider returned no reply text")]
    EmptyReply,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Capability: submit image + text, receive text
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// `image_data` is a data URI (or any URL the provider accepts)
    async fn analyze(&self, image_data: &str, prompt: &str) -> Result<String, VisionError>;
}

// ============================================================================
// Chat completions wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
    detail: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// OpenAI implementation
// ============================================================================

/// Chat-completions client for OpenAI-compatible providers
pub struct OpenAiVisionClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    detail: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiVisionClient {
    /// Build a client; a missing `api_key` makes every call fail with
    /// [`VisionError::NotConfigured`]
    pub fn new(config: &VisionConfig, api_key: Option<String>) -> Result<Self, VisionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VisionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            detail: config.detail.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request_body<'a>(&'a self, image_data: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data,
                            detail: &self.detail,
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn analyze(&self, image_data: &str, prompt: &str) -> Result<String, VisionError> {
        let api_key = self.api_key.as_deref().ok_or(VisionError::NotConfigured)?;

        tracing::debug!(
            model = %self.model,
            detail = %self.detail,
            image_bytes = image_data.len(),
            "Querying vision provider"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(image_data, prompt))
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Parse(e.to_string()))?;

        let reply = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(VisionError::EmptyReply)?;

        tracing::debug!(reply = %reply, "Vision provider reply");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiVisionClient::new(&VisionConfig::default(), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let config = VisionConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..VisionConfig::default()
        };
        let client = OpenAiVisionClient::new(&config, None).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let client =
            OpenAiVisionClient::new(&VisionConfig::default(), Some("key".to_string())).unwrap();
        let body = serde_json::to_value(client.request_body("data:image/png;base64,AAAA", "grade it"))
            .unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1000);
        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "grade it");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
        assert_eq!(content[1]["image_url"]["detail"], "high");
    }

    #[test]
    fn test_reply_extraction_shape() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = OpenAiVisionClient::new(&VisionConfig::default(), None).unwrap();
        let result = client.analyze("data:image/png;base64,AAAA", "prompt").await;
        assert!(matches!(result, Err(VisionError::NotConfigured)));
    }
}
