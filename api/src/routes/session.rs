use axum::extract::State;
use axum::{Json, Router, routing::post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_id";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/reset-session", post(reset))
}

/// Session id from the request cookie, if present and well-formed.
/// Garbage values count as absent; the caller mints a replacement.
pub fn resolve_session(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Cookie matching the original deployment: HTTP-only, `SameSite=Lax`,
/// non-secure (served behind plain HTTP).
pub fn session_cookie(session_id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(false)
        .path("/")
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[derive(Serialize, ToSchema)]
pub struct StartResponse {
    /// Greeting text, rendered by the client as the first bot turn.
    pub response: String,
    pub session_id: Uuid,
}

#[derive(Serialize, ToSchema)]
pub struct ResetResponse {
    pub message: String,
    /// Replacement session id, already set as the cookie.
    pub session_id: Uuid,
}

/// Begin a fresh conversation
///
/// Always mints a new session, greets it, and sets the session cookie.
/// A superseded session from a previous cookie is dropped immediately
/// instead of lingering until TTL expiry.
#[utoipa::path(
    post,
    path = "/start",
    responses(
        (status = 200, description = "Session established", body = StartResponse)
    ),
    tag = "session"
)]
pub async fn start(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<StartResponse>) {
    if let Some(old) = resolve_session(&jar) {
        state.dialogue.reset_session(old);
    }

    let session_id = Uuid::now_v7();
    state.dialogue.start_session(session_id).await;
    tracing::info!(%session_id, "session started");

    let jar = jar.add(session_cookie(session_id));
    (
        jar,
        Json(StartResponse {
            response: state.dialogue.greeting().to_string(),
            session_id,
        }),
    )
}

/// Abandon the current conversation
///
/// Clears the session cookie and reissues a fresh id. The replacement
/// session stays empty until `/start` or the first message greets it.
#[utoipa::path(
    post,
    path = "/reset-session",
    responses(
        (status = 200, description = "Session cleared and reissued", body = ResetResponse)
    ),
    tag = "session"
)]
pub async fn reset(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<ResetResponse>) {
    if let Some(old) = resolve_session(&jar) {
        state.dialogue.reset_session(old);
    }

    let session_id = Uuid::now_v7();
    let jar = jar.remove(removal_cookie()).add(session_cookie(session_id));
    (
        jar,
        Json(ResetResponse {
            message: "Session cookie cleared".to_string(),
            session_id,
        }),
    )
}
