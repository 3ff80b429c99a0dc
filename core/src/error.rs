use serde::Serialize;
use utoipa::ToSchema;

/// Structured error response shared by every endpoint.
/// Frontends branch on `error`; `message` is for log lines and debugging,
/// never for display logic.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "upstream_error")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Offending request field, when one can be named
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The rejected value as received, echoed for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Correlation id for matching a response to server logs
    pub request_id: String,
    /// Short pointer toward correct usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

impl ApiError {
    /// Body for failures whose detail is logged server-side only.
    pub fn opaque(code: &str, message: &str, request_id: String) -> Self {
        ApiError {
            error: code.to_string(),
            message: message.to_string(),
            field: None,
            received: None,
            request_id,
            docs_hint: None,
        }
    }
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const UPSTREAM_ERROR: &str = "upstream_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_from_the_wire() {
        let body = ApiError::opaque(
            codes::INTERNAL_ERROR,
            "An internal error occurred",
            "req-1".to_string(),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["request_id"], "req-1");
        assert!(json.get("field").is_none());
        assert!(json.get("received").is_none());
        assert!(json.get("docs_hint").is_none());
    }
}
