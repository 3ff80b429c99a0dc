use axum::extract::{MatchedPath, State};
use axum::{Json, Router, routing::post};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use maum_core::error::ApiError;
use maum_core::summary::SummaryItem;
use maum_core::variant::DialogueVariant;

use crate::dialogue::DialogueOutcome;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::session::{resolve_session, session_cookie};
use crate::state::AppState;

/// One route per variant, all served by the same handler; the variant is
/// recovered from the matched path. Adding a variant means adding a binding,
/// not a handler.
pub fn router() -> Router<AppState> {
    let mut router = Router::new();
    for variant in DialogueVariant::ALL {
        router = router.route(variant.binding().route_path, post(exchange));
    }
    router
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's utterance. Must be non-empty; whitespace is preserved.
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_items: Option<Vec<SummaryItem>>,
    #[serde(rename = "totalScore", skip_serializing_if = "Option::is_none")]
    pub total_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
}

impl From<DialogueOutcome> for ChatResponse {
    fn from(outcome: DialogueOutcome) -> Self {
        ChatResponse {
            response: outcome.reply,
            conversation_history: outcome.history,
            summary: outcome.summary,
            summary_items: outcome.summary_items,
            total_score: outcome.total_score,
            slots: outcome.slots,
            finished: outcome.finished,
        }
    }
}

fn validate_message(req: &ChatRequest) -> Result<&str, AppError> {
    if req.message.is_empty() {
        return Err(AppError::Validation {
            message: "message must not be empty".to_string(),
            field: Some("message".to_string()),
            received: Some(serde_json::Value::String(req.message.clone())),
            docs_hint: Some(r#"Send {"message": "..."} with the user's utterance."#.to_string()),
        });
    }
    Ok(&req.message)
}

/// Exchange one message with the dialogue engine
///
/// Served on `/chatbot` (adaptive, editable), `/phq9_high_c_low_u` (adaptive,
/// read-only), `/phq9_fixed_editable` (fixed, editable) and `/phq9_fixed`
/// (fixed, read-only). The variants share this handler and differ only in
/// which optional response fields appear. A request without a session cookie
/// starts a session implicitly.
#[utoipa::path(
    post,
    path = "/chatbot",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Engine or rule reply", body = ChatResponse),
        (status = 400, description = "Missing or empty message", body = ApiError),
        (status = 500, description = "Dialogue engine failure", body = ApiError)
    ),
    tag = "dialogue"
)]
pub async fn exchange(
    State(state): State<AppState>,
    matched: MatchedPath,
    jar: CookieJar,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<(CookieJar, Json<ChatResponse>), AppError> {
    let message = validate_message(&req)?;
    let variant = DialogueVariant::resolve(matched.as_str());

    let (session_id, jar) = match resolve_session(&jar) {
        Some(id) => (id, jar),
        None => {
            let id = Uuid::now_v7();
            tracing::info!(session_id = %id, "implicit session start");
            (id, jar.add(session_cookie(id)))
        }
    };

    let outcome = state
        .dialogue
        .handle_message(session_id, variant, message)
        .await?;
    Ok((jar, Json(outcome.into())))
}
