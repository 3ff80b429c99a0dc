//! JSON body extraction with structured rejections.
//!
//! `AppJson<T>` stands in for `axum::Json<T>` in handler signatures. Where the
//! stock extractor answers a malformed body with a plain-text 422, this one
//! produces the same `ApiError` JSON shape as every other failure, naming the
//! offending field when serde reports one.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(reject)?;
        Ok(AppJson(value))
    }
}

fn reject(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    let field = missing_field_name(&body_text).unwrap_or_else(|| "body".to_string());

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field),
        received: None,
        docs_hint: Some(
            "Check the request body against the endpoint's schema (GET /api-doc/openapi.json)."
                .to_string(),
        ),
    }
}

/// Field name out of serde's ``missing field `x` `` message, if that is what
/// failed.
fn missing_field_name(msg: &str) -> Option<String> {
    let (_, rest) = msg.split_once("missing field `")?;
    let (name, _) = rest.split_once('`')?;
    Some(name.to_string())
}
