//! The dialogue engine boundary.
//!
//! Every variant speaks the same outbound contract: the current message, the
//! encoded transcript, and the session id (an opaque dialogue-state key for
//! the engine). Replies differ per variant only in which optional fields are
//! present; normalization to the public contract happens in the orchestrator,
//! not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use maum_core::summary::SummaryItem;

/// Payload forwarded to the engine for one exchange.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutboundTurn {
    pub message: String,
    pub conversation_history: String,
    pub user_id: String,
}

/// Engine reply. `response` is always present; everything else is
/// variant-dependent and unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EngineReply {
    pub response: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub summary_items: Option<Vec<SummaryItem>>,
    #[serde(default, rename = "totalScore")]
    pub total_score: Option<i32>,
    /// Per-question slot state; the engine's shape varies by variant, so it
    /// is passed through untyped.
    #[serde(default)]
    pub slots: Option<serde_json::Value>,
    #[serde(default)]
    pub finished: Option<bool>,
}

/// Failure talking to the engine. No partial state: callers only mutate the
/// conversation window after a successful reply.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport failure contacting dialogue engine: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dialogue engine returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("dialogue engine reply could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// One request/response exchange with the dialogue engine. No retry.
#[async_trait]
pub trait DialogueBackend: Send + Sync {
    async fn send(&self, upstream_path: &str, turn: OutboundTurn)
        -> Result<EngineReply, UpstreamError>;
}

/// reqwest-backed engine client against a configured base URL.
pub struct HttpDialogueBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDialogueBackend {
    pub fn new(client: reqwest::Client, base_url: &Url) -> Self {
        HttpDialogueBackend {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DialogueBackend for HttpDialogueBackend {
    async fn send(
        &self,
        upstream_path: &str,
        turn: OutboundTurn,
    ) -> Result<EngineReply, UpstreamError> {
        let url = format!("{}{}", self.base_url, upstream_path);
        let response = self.client.post(&url).json(&turn).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(UpstreamError::Decode)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    fn turn(message: &str) -> OutboundTurn {
        OutboundTurn {
            message: message.to_string(),
            conversation_history: String::new(),
            user_id: "test-session".to_string(),
        }
    }

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        Url::parse(&format!("http://{addr}")).expect("loopback url")
    }

    #[tokio::test]
    async fn decodes_full_engine_reply() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                let message = body["message"].as_str().unwrap_or_default().to_string();
                Json(serde_json::json!({
                    "response": format!("받았어요: {message}"),
                    "totalScore": 7,
                    "slots": [{"score": 1}],
                    "ignored_extra_field": true,
                }))
            }),
        );
        let base = serve(app).await;

        let backend = HttpDialogueBackend::new(reqwest::Client::new(), &base);
        let reply = backend
            .send("/api/chat", turn("오늘 힘들었어요"))
            .await
            .expect("engine reply");

        assert_eq!(reply.response, "받았어요: 오늘 힘들었어요");
        assert_eq!(reply.total_score, Some(7));
        assert_eq!(reply.slots, Some(serde_json::json!([{"score": 1}])));
        assert!(reply.summary.is_none());
        assert!(reply.finished.is_none());
    }

    #[tokio::test]
    async fn posts_full_outbound_contract() {
        let app = Router::new().route(
            "/api/phq9_fixed",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["message"], "네");
                assert_eq!(body["conversation_history"], "인사|네|답변");
                assert_eq!(body["user_id"], "session-9");
                Json(serde_json::json!({"response": "다음 질문입니다."}))
            }),
        );
        let base = serve(app).await;

        let backend = HttpDialogueBackend::new(reqwest::Client::new(), &base);
        let reply = backend
            .send(
                "/api/phq9_fixed",
                OutboundTurn {
                    message: "네".to_string(),
                    conversation_history: "인사|네|답변".to_string(),
                    user_id: "session-9".to_string(),
                },
            )
            .await
            .expect("engine reply");

        assert_eq!(reply.response, "다음 질문입니다.");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(app).await;

        let backend = HttpDialogueBackend::new(reqwest::Client::new(), &base);
        let err = backend
            .send("/api/chat", turn("x"))
            .await
            .expect_err("500 must fail");

        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let app = Router::new().route("/api/chat", post(|| async { "not json" }));
        let base = serve(app).await;

        let backend = HttpDialogueBackend::new(reqwest::Client::new(), &base);
        let err = backend
            .send("/api/chat", turn("x"))
            .await
            .expect_err("garbage body must fail");

        assert!(matches!(err, UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_transport_error() {
        // Bind to learn a free port, then drop the listener so nothing answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let base = Url::parse(&format!("http://{addr}")).expect("loopback url");
        let backend = HttpDialogueBackend::new(reqwest::Client::new(), &base);
        let err = backend
            .send("/api/chat", turn("x"))
            .await
            .expect_err("refused connection must fail");

        assert!(matches!(err, UpstreamError::Transport(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let base = Url::parse("http://localhost:5000/").expect("url");
        let backend = HttpDialogueBackend::new(reqwest::Client::new(), &base);
        assert_eq!(backend.base_url, "http://localhost:5000");
    }
}
