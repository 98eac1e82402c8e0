//! Model gateway: one chat-completion call to the hosted model.
//!
//! The gateway is the only stage with network I/O. It makes exactly one
//! attempt; there is no retry or backoff. The three failure modes map to
//! distinct errors so callers can tell a slow upstream
//! ([`ReviewError::UpstreamTimeout`]) from a broken one
//! ([`ReviewError::UpstreamMalformed`], [`ReviewError::UpstreamError`]).
//!
//! [`ChatCompletion`] is the seam the orchestrator talks to. The HTTP
//! implementation receives its credential at construction, so tests can
//! swap in a fake without touching the environment.

use crate::config::ReviewConfig;
use crate::error::ReviewError;
use crate::prompts::AnalysisPrompt;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Raw model output plus call latency.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub raw_content: String,
    pub elapsed_secs: f64,
}

/// Sends a prompt to a chat model and returns its raw text content.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &AnalysisPrompt) -> Result<ModelResponse, ReviewError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

// ── HTTP implementation ──────────────────────────────────────────────────

/// OpenAI-compatible chat-completions client.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
}

impl HttpGateway {
    pub fn from_config(config: &ReviewConfig) -> Result<Self, ReviewError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReviewError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ReviewError {
        if e.is_timeout() {
            ReviewError::UpstreamTimeout {
                secs: self.timeout_secs,
            }
        } else {
            ReviewError::UpstreamError {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ChatCompletion for HttpGateway {
    async fn complete(&self, prompt: &AnalysisPrompt) -> Result<ModelResponse, ReviewError> {
        let start = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user_content,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        info!("Calling upstream model '{}'", self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!("Upstream returned HTTP {}", status);
            return Err(ReviewError::UpstreamError {
                message: format!("HTTP {}: {}", status, snippet(&text)),
            });
        }

        let raw_content = extract_content(&text)?;
        let elapsed_secs = start.elapsed().as_secs_f64();
        debug!(
            "Upstream answered in {:.2}s with {} chars",
            elapsed_secs,
            raw_content.len()
        );

        Ok(ModelResponse {
            raw_content,
            elapsed_secs,
        })
    }
}

/// Pull `choices[0].message.content` out of a completions response body.
pub fn extract_content(body: &str) -> Result<String, ReviewError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ReviewError::UpstreamMalformed {
        detail: format!("body is not JSON: {e}"),
    })?;

    let content = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| ReviewError::UpstreamMalformed {
            detail: "missing choices[0].message.content".into(),
        })?;

    Ok(content.to_string())
}

/// Trim an upstream error body for inclusion in a message.
fn snippet(body: &str) -> String {
    const MAX: usize = 300;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        body: String,
        delay: Duration,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn handle(
        State(up): State<Upstream>,
        headers: HeaderMap,
        Json(req): Json<Value>,
    ) -> (StatusCode, String) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        up.seen.lock().unwrap().push((auth, req));
        tokio::time::sleep(up.delay).await;
        (up.status, up.body.clone())
    }

    /// Spawn a fake upstream on an ephemeral port and return a gateway
    /// pointed at it.
    async fn gateway_against(up: Upstream, timeout_secs: u64) -> HttpGateway {
        let app = Router::new()
            .route("/v1/chat/completions", post(handle))
            .with_state(up);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ReviewConfig::builder()
            .endpoint(format!("http://{addr}/v1/chat/completions"))
            .api_key("sk-test")
            .timeout_secs(timeout_secs)
            .build()
            .unwrap();
        HttpGateway::from_config(&config).unwrap()
    }

    fn upstream(status: StatusCode, body: &str) -> Upstream {
        Upstream {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn prompt() -> AnalysisPrompt {
        AnalysisPrompt {
            system_instruction: "be a lawyer".into(),
            user_content: "contract".into(),
        }
    }

    #[tokio::test]
    async fn sends_wire_contract_and_returns_content() {
        let up = upstream(
            StatusCode::OK,
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"overall_risk\":\"low\"}"}}]}"#,
        );
        let seen = Arc::clone(&up.seen);
        let gw = gateway_against(up, 5).await;

        let resp = gw.complete(&prompt()).await.unwrap();
        assert_eq!(resp.raw_content, r#"{"overall_risk":"low"}"#);

        let seen = seen.lock().unwrap();
        let (auth, req) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(req["model"], "qwen3-235b-a22b");
        assert_eq!(req["response_format"]["type"], "json_object");
        assert_eq!(req["max_tokens"], 2000);
        assert!((req["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(req["messages"][0]["role"], "system");
        assert_eq!(req["messages"][0]["content"], "be a lawyer");
        assert_eq!(req["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let mut up = upstream(StatusCode::OK, "{}");
        up.delay = Duration::from_secs(3);
        let gw = gateway_against(up, 1).await;

        let err = gw.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ReviewError::UpstreamTimeout { secs: 1 }), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let gw = gateway_against(upstream(StatusCode::OK, r#"{"choices":[]}"#), 5).await;
        let err = gw.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ReviewError::UpstreamMalformed { .. }));
    }

    #[tokio::test]
    async fn auth_failure_is_upstream_error() {
        let gw = gateway_against(
            upstream(StatusCode::UNAUTHORIZED, r#"{"error":"invalid api key"}"#),
            5,
        )
        .await;
        let err = gw.complete(&prompt()).await.unwrap_err();
        match err {
            ReviewError::UpstreamError { message } => {
                assert!(message.contains("401"), "got {message}");
                assert!(message.contains("invalid api key"));
            }
            other => panic!("expected UpstreamError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_upstream_error() {
        // Bind and immediately drop to get a port nobody listens on.
        let addr = {
            let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let config = ReviewConfig::builder()
            .endpoint(format!("http://{addr}/v1/chat/completions"))
            .build()
            .unwrap();
        let gw = HttpGateway::from_config(&config).unwrap();

        let err = gw.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ReviewError::UpstreamError { .. }), "got {err:?}");
    }

    #[test]
    fn extract_content_shapes() {
        assert!(matches!(
            extract_content("<html>502</html>"),
            Err(ReviewError::UpstreamMalformed { .. })
        ));
        assert!(matches!(
            extract_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(ReviewError::UpstreamMalformed { .. })
        ));
        assert!(matches!(
            extract_content(r#"{"id":"x"}"#),
            Err(ReviewError::UpstreamMalformed { .. })
        ));
        assert_eq!(
            extract_content(r#"{"choices":[{"message":{"content":"not json"}}]}"#).unwrap(),
            "not json"
        );
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(1000);
        let s = snippet(&long);
        assert!(s.chars().count() <= 301);
        assert!(s.ends_with('…'));
    }
}
