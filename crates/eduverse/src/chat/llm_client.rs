//! OpenAI-compatible chat-completions client.
//!
//! One streaming POST per chat turn; the SSE body is parsed line by line and
//! only the content deltas are handed back to the caller.
use std::time::Duration;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Message;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<ChatDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatDelta {
    content: Option<String>,
}

pub struct LlmClient {
    api_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: Option<String>, model: String, max_tokens: u32) -> Self {
        info!("LLM client initialized for {} (model {})", api_url, model);
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            max_tokens,
            http_client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.llm_api_url.clone(),
            cfg.llm_api_key.clone(),
            cfg.llm_model.clone(),
            cfg.llm_max_tokens,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url)
    }

    /// Open a streaming completion. Errors before the first byte become
    /// `UpstreamUnavailable`; errors after that end the stream.
    pub async fn stream_chat(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<BoxStream<'static, Result<String>>> {
        let Some(api_key) = self.api_key.as_deref() else {
            metrics::inc_upstream_failure();
            return Err(AppError::UpstreamUnavailable("LLM API key is not configured".into()));
        };

        debug!("Starting chat stream with {} message(s), temperature {}", messages.len(), temperature);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature,
            stream: true,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::inc_upstream_failure();
                AppError::UpstreamUnavailable(format!("LLM request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::inc_upstream_failure();
            return Err(AppError::UpstreamUnavailable(format!(
                "LLM provider returned {}: {}",
                status, body
            )));
        }

        let byte_stream = response.bytes_stream();
        let deltas = async_stream::try_stream! {
            let mut buffer = String::new();
            futures_util::pin_mut!(byte_stream);
            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = chunk_result.map_err(|e| {
                    warn!("Chat stream interrupted: {}", e);
                    AppError::UpstreamUnavailable(format!("Stream read error: {}", e))
                })?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].trim().to_string();
                    buffer.drain(..=newline_pos);
                    match parse_sse_line(&line) {
                        SseLine::Skip => continue,
                        SseLine::Done => return,
                        SseLine::Delta { content, finished } => {
                            if !content.is_empty() {
                                yield content;
                            }
                            if finished {
                                return;
                            }
                        }
                    }
                }
            }
            // A provider may close without a trailing newline
            if let SseLine::Delta { content, .. } = parse_sse_line(buffer.trim()) {
                if !content.is_empty() {
                    yield content;
                }
            }
        };
        Ok(deltas.boxed())
    }
}

#[derive(Debug, PartialEq)]
enum SseLine {
    Skip,
    Done,
    Delta { content: String, finished: bool },
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            let finished = chunk.choices.iter().any(|c| c.finish_reason.is_some());
            let content = chunk
                .choices
                .into_iter()
                .filter_map(|c| c.delta.and_then(|d| d.content))
                .collect::<String>();
            SseLine::Delta { content, finished }
        }
        Err(e) => {
            debug!("Ignoring unparseable SSE payload: {}", e);
            SseLine::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    fn user(content: &str) -> Vec<Message> {
        vec![Message {
            role: "user".into(),
            content: content.into(),
        }]
    }

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_line("data: {not json"), SseLine::Skip);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hi"},"finish_reason":null}]}"#),
            SseLine::Delta { content: "Hi".into(), finished: false }
        );
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#),
            SseLine::Delta { content: String::new(), finished: true }
        );
    }

    #[tokio::test]
    async fn test_stream_yields_deltas_in_order() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Photo\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"synthesis\"},\"finish_reason\":null}]}\n\n",
            "data: [DONE]\n\n",
        );
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"test-model","stream":true,"temperature":0.3}"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let client = LlmClient::new(server.url(), Some("test-key".into()), "test-model".into(), 256);
        let stream = client.stream_chat(&user("What is photosynthesis?"), 0.3).await.unwrap();
        let parts: Vec<String> = stream.try_collect().await.unwrap();

        assert_eq!(parts, vec!["Photo".to_string(), "synthesis".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = LlmClient::new(server.url(), Some("k".into()), "m".into(), 64);
        let err = client.stream_chat(&user("hi"), 0.7).await.err().unwrap();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_calling_out() {
        let client = LlmClient::new("http://127.0.0.1:9".into(), None, "m".into(), 64);
        assert!(!client.is_configured());
        let err = client.stream_chat(&user("hi"), 0.7).await.err().unwrap();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }
}
