/// LLM Client — the single network boundary of the matching engine.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Everything goes through the `ModelInvoker` trait so analyses can run
/// against any backend with the same request/response shape.
///
/// No retries happen here. A failed call is reported once and the caller
/// decides what to do with it.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Classification work, not creative writing: keep sampling close to greedy.
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured for the language model (set OPENAI_API_KEY)")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that can turn a (system, prompt) pair into raw model text.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Identifier recorded on every analysis this invoker produces.
    fn model_name(&self) -> &str;
}

/// Connection settings for `LlmClient`, taken from `Config`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, trimmed. `None` when the model sent nothing.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .iter()
            .find_map(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client (OpenAI wire format).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    timeout_secs: u64,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let api_key = settings
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingCredential)?;

        // Never below one second.
        let timeout_secs = settings.timeout_secs.max(1);
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            model: settings.model,
            timeout_secs,
        })
    }

    /// Makes a single call to the completion endpoint and returns the decoded response.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let chat: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }

    fn classify(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            LlmError::Http(error)
        }
    }
}

#[async_trait]
impl ModelInvoker for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(system, prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            api_key: api_key.map(String::from),
            base_url: "http://localhost:1/v1/".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn test_missing_key_is_missing_credential() {
        assert!(matches!(
            LlmClient::new(settings(None)),
            Err(LlmError::MissingCredential)
        ));
    }

    #[test]
    fn test_blank_key_is_missing_credential() {
        assert!(matches!(
            LlmClient::new(settings(Some("  "))),
            Err(LlmError::MissingCredential)
        ));
    }

    #[test]
    fn test_endpoint_joins_base_url_without_double_slash() {
        let client = LlmClient::new(settings(Some("sk-test"))).unwrap();
        assert_eq!(client.endpoint, "http://localhost:1/v1/chat/completions");
        assert_eq!(client.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_zero_timeout_is_raised_to_one_second() {
        let client = LlmClient::new(LlmSettings {
            timeout_secs: 0,
            ..settings(Some("sk-test"))
        })
        .unwrap();
        assert_eq!(client.timeout_secs, 1);
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 1500);
        assert_eq!(json["messages"][0]["role"], "user");
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_takes_first_non_empty_choice() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  {\"a\": 1}\n"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_response_without_content_has_no_text() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_api_error_message_prefers_provider_message() {
        let body = r#"{"error": {"message": "You exceeded your current quota", "type": "insufficient_quota"}}"#;
        assert_eq!(
            api_error_message(body.to_string()),
            "You exceeded your current quota"
        );
        assert_eq!(api_error_message("bad gateway".to_string()), "bad gateway");
    }

    /// Reads one HTTP request (headers plus `Content-Length` body) off the socket.
    async fn read_request(stream: &mut tokio::net::TcpStream) {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn local_settings(listener: &tokio::net::TcpListener) -> LlmSettings {
        let addr = listener.local_addr().unwrap();
        LlmSettings {
            api_key: Some("sk-test".to_string()),
            base_url: format!("http://{addr}/v1"),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = local_settings(&listener);

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            // Hold the connection open without ever answering.
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });

        let client = LlmClient::new(settings).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(
            matches!(result, Err(LlmError::Timeout { secs: 1 })),
            "{result:?}"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error_with_provider_message() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = local_settings(&listener);

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            let body = r#"{"error":{"message":"quota gone"}}"#;
            let response = format!(
                "HTTP/1.1 429 Too Many Requests\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        let client = LlmClient::new(settings).unwrap();
        match client.complete("system", "prompt").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota gone");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_error_without_retrying() {
        let client = LlmClient::new(settings(Some("sk-test"))).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(matches!(
            result,
            Err(LlmError::Http(_)) | Err(LlmError::Timeout { .. })
        ));
    }
}
