//! Session orchestration.
//!
//! One shared pipeline serves all four variants: ensure greeting, rule
//! short-circuit, engine exchange, window append, then field masking. The
//! variants differ only in their binding (upstream path + declared fields),
//! never in control flow.

use std::sync::Arc;

use uuid::Uuid;

use maum_core::rulebook::RuleBook;
use maum_core::summary::SummaryItem;
use maum_core::variant::{DialogueVariant, VariantBinding};

use crate::session::SessionStore;
use crate::upstream::{DialogueBackend, EngineReply, OutboundTurn, UpstreamError};

/// Normalized result of one handled message, already filtered down to the
/// active variant's declared fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueOutcome {
    pub reply: String,
    pub history: Option<String>,
    pub summary: Option<String>,
    pub summary_items: Option<Vec<SummaryItem>>,
    pub total_score: Option<i32>,
    pub slots: Option<serde_json::Value>,
    pub finished: Option<bool>,
}

pub struct DialogueService {
    sessions: Arc<SessionStore>,
    backend: Arc<dyn DialogueBackend>,
    rules: RuleBook,
    greeting: String,
    record_rule_replies: bool,
}

impl DialogueService {
    pub fn new(
        sessions: Arc<SessionStore>,
        backend: Arc<dyn DialogueBackend>,
        rules: RuleBook,
        greeting: impl Into<String>,
        record_rule_replies: bool,
    ) -> Self {
        DialogueService {
            sessions,
            backend,
            rules,
            greeting: greeting.into(),
            record_rule_replies,
        }
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Establish (or re-touch) a session: the greeting is pinned into its
    /// window so the transcript and the rendered conversation agree.
    pub async fn start_session(&self, session_id: Uuid) {
        let entry = self.sessions.resolve_or_create(session_id);
        let mut session = entry.lock().await;
        session.window.ensure_greeting(&self.greeting);
    }

    /// Forget the session. The caller mints the replacement id.
    pub fn reset_session(&self, session_id: Uuid) {
        if self.sessions.remove(session_id) {
            tracing::debug!(%session_id, "session reset");
        }
    }

    /// Handle one user message under `variant`'s policy.
    ///
    /// The entry lock is held across the engine call: requests for the same
    /// session are serialized, so concurrent tabs cannot fork the window.
    /// On an engine failure the window is left exactly as it was; the client
    /// resends the same message against unchanged state.
    pub async fn handle_message(
        &self,
        session_id: Uuid,
        variant: DialogueVariant,
        user_text: &str,
    ) -> Result<DialogueOutcome, UpstreamError> {
        let binding = variant.binding();
        let entry = self.sessions.resolve_or_create(session_id);
        let mut session = entry.lock().await;
        session.window.ensure_greeting(&self.greeting);

        if let Some(rule_reply) = self.rules.lookup(user_text) {
            if self.record_rule_replies {
                session.window.append(user_text, rule_reply);
                return Ok(mask_outcome(
                    binding,
                    rule_reply.to_string(),
                    session.window.encode(),
                    EngineReply::default(),
                ));
            }
            // Faithful reading: the canned reply exists outside the
            // transcript, so nothing is echoed back either.
            tracing::debug!(%session_id, "rule short-circuit");
            return Ok(DialogueOutcome {
                reply: rule_reply.to_string(),
                ..DialogueOutcome::default()
            });
        }

        let outbound = OutboundTurn {
            message: user_text.to_string(),
            conversation_history: session.window.encode(),
            user_id: session_id.to_string(),
        };
        let reply = self.backend.send(binding.upstream_path, outbound).await?;

        session.window.append(user_text, &reply.response);
        let encoded = session.window.encode();
        let reply_text = reply.response.clone();
        Ok(mask_outcome(binding, reply_text, encoded, reply))
    }
}

/// Project an engine reply onto the variant's declared field subset.
/// Undeclared fields are dropped even when the engine sent them; the
/// fixed+editable variant reports `summary_items` as `[]` rather than
/// omitting it.
fn mask_outcome(
    binding: &VariantBinding,
    reply_text: String,
    encoded_history: String,
    engine: EngineReply,
) -> DialogueOutcome {
    let fields = &binding.fields;
    let summary_items = if fields.summary_items {
        if binding.variant == DialogueVariant::FixedEditable {
            Some(engine.summary_items.unwrap_or_default())
        } else {
            engine.summary_items
        }
    } else {
        None
    };

    DialogueOutcome {
        reply: reply_text,
        history: fields.echo_history.then_some(encoded_history),
        summary: if fields.summary { engine.summary } else { None },
        summary_items,
        total_score: if fields.total_score {
            engine.total_score
        } else {
            None
        },
        slots: if fields.slots { engine.slots } else { None },
        finished: if fields.finished { engine.finished } else { None },
    }
}
