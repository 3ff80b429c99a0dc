use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use maum_core::error::ApiError;
use maum_core::summary::{EditedSummaryRecord, clean_edited_items};

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/summary/edit", post(submit_edits))
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitEditsRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Raw edit rows as the client's form state holds them; cleaned
    /// server-side rather than rejected wholesale.
    #[serde(default)]
    pub edited_items: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
pub struct SubmitEditsResponse {
    pub message: String,
    /// Id of the stored record.
    pub id: Uuid,
    /// How many items survived cleaning.
    pub count: usize,
}

fn validate_edits(req: &SubmitEditsRequest) -> Result<EditedSummaryRecord, AppError> {
    let user_id = req
        .user_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation {
            message: "user_id required".to_string(),
            field: Some("user_id".to_string()),
            received: req.user_id.clone().map(serde_json::Value::String),
            docs_hint: None,
        })?;

    let raw = req.edited_items.as_array().ok_or_else(|| AppError::Validation {
        message: "edited_items must be an array".to_string(),
        field: Some("edited_items".to_string()),
        received: None,
        docs_hint: Some(
            r#"Send edited_items as [{"item": "...", "edited_answer": "..."}, ...]."#.to_string(),
        ),
    })?;

    let cleaned = clean_edited_items(raw);
    if cleaned.is_empty() {
        return Err(AppError::Validation {
            message: "no valid edited_items".to_string(),
            field: Some("edited_items".to_string()),
            received: Some(req.edited_items.clone()),
            docs_hint: Some("Every entry needs a non-empty item field.".to_string()),
        });
    }

    Ok(EditedSummaryRecord::new(user_id, cleaned))
}

/// Save user edits to a finalized summary
///
/// Writes one immutable annotation record. The scored transcript and the
/// canonical summary are never read or modified by this path.
#[utoipa::path(
    post,
    path = "/summary/edit",
    request_body = SubmitEditsRequest,
    responses(
        (status = 200, description = "Edits saved", body = SubmitEditsResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    ),
    tag = "summary"
)]
pub async fn submit_edits(
    State(state): State<AppState>,
    AppJson(req): AppJson<SubmitEditsRequest>,
) -> Result<Json<SubmitEditsResponse>, AppError> {
    let record = validate_edits(&req)?;

    let items_json = serde_json::to_value(&record.edited_items)
        .map_err(|e| AppError::Internal(format!("Failed to serialize edited_items: {}", e)))?;

    sqlx::query(
        "INSERT INTO edited_summaries (id, user_id, edited_items, saved_at) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(&items_json)
    .bind(record.saved_at)
    .execute(&state.db)
    .await?;

    tracing::info!(record_id = %record.id, count = record.edited_items.len(), "summary edits saved");

    Ok(Json(SubmitEditsResponse {
        message: "edited summary saved".to_string(),
        id: record.id,
        count: record.edited_items.len(),
    }))
}
