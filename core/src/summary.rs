use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// One questionnaire item as the dialogue engine reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SummaryItem {
    /// Item number within the questionnaire (1-based).
    #[serde(default)]
    pub num: u32,
    /// The item text shown to the user.
    pub item: String,
    /// The engine's summarized answer for this item.
    #[serde(default)]
    pub answer: String,
}

/// One summary item as revised by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct EditedItem {
    pub item: String,
    pub edited_answer: String,
}

/// A persisted batch of user-edited summary items.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditedSummaryRecord {
    pub id: Uuid,
    pub user_id: String,
    pub edited_items: Vec<EditedItem>,
    pub saved_at: DateTime<Utc>,
}

impl EditedSummaryRecord {
    pub fn new(user_id: impl Into<String>, edited_items: Vec<EditedItem>) -> Self {
        EditedSummaryRecord {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            edited_items,
            saved_at: Utc::now(),
        }
    }
}

/// Normalize a client-submitted edit batch.
///
/// Clients send whatever their form state holds, so the batch is cleaned
/// rather than rejected wholesale: non-object entries are dropped, `item`
/// must be a non-empty string, and `edited_answer` is trimmed with a missing
/// value treated as "". An empty answer is a deliberate deletion and is kept.
pub fn clean_edited_items(raw: &[Value]) -> Vec<EditedItem> {
    raw.iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let item = obj.get("item")?.as_str()?;
            if item.is_empty() {
                return None;
            }
            let edited_answer = obj
                .get("edited_answer")
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_owned();
            Some(EditedItem {
                item: item.to_owned(),
                edited_answer,
            })
        })
        .collect()
}
