//! # HTTP Utilities
//!
//! Response-body parsing and status messaging for admin API calls.

use da_types::ResponseBody;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use da_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("DA_ADMIN_TOKEN"));
///
/// assert!(status_error_message(404).unwrap().contains("Not Found"));
/// assert!(status_error_message(500).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: set DA_ADMIN_TOKEN=... or pass --token".into()),
        403 => Some("Forbidden (403). Hint: check organization and repository permissions".into()),
        404 => Some("Not Found (404). Hint: verify org, repo and path".into()),
        429 => Some("Too Many Requests (429). Hint: the admin API is rate limiting this client".into()),
        _ => None,
    }
}

/// Whether a `content-type` header value denotes a JSON payload.
///
/// Accepts `application/json`, parameters such as `; charset=utf-8`, and
/// structured-syntax suffixes like `application/problem+json`.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Parse a response body according to its `content-type` header.
///
/// - An empty (or whitespace-only) body yields [`ResponseBody::Empty`] for
///   non-JSON types and an empty JSON object for JSON types.
/// - A JSON content type whose payload does not parse also yields an empty
///   object; the failure is logged at `warn` with a 200-character preview.
/// - Everything else is decoded as UTF-8 text (lossily).
pub fn parse_response_body(content_type: Option<&str>, body: &[u8], status: StatusCode) -> ResponseBody {
    let text = String::from_utf8_lossy(body);
    let declares_json = content_type.is_some_and(is_json_content_type);

    if !declares_json {
        return if text.trim().is_empty() {
            ResponseBody::Empty
        } else {
            ResponseBody::Text(text.into_owned())
        };
    }
    if text.trim().is_empty() {
        return ResponseBody::Json(Value::Object(Map::new()));
    }

    match parse_response_json_strict(&text, Some(status)) {
        Ok(value) => ResponseBody::Json(value),
        Err(error) => {
            warn!(
                status = status.as_u16(),
                error = %error.source,
                body_preview = error.body_preview(),
                "response declared JSON but did not parse; using an empty object"
            );
            ResponseBody::Json(Value::Object(Map::new()))
        }
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// Any parse error is decorated with the originating HTTP status and up to 200
/// characters of the body (whitespace collapsed).
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

/// Collapse whitespace and truncate a body for inclusion in error messages.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/Problem+JSON"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("text/plain; note=json"));
    }

    #[test]
    fn parses_json_and_text_bodies() {
        let json_body = parse_response_body(Some("application/json"), br#"{"ok":true}"#, StatusCode::OK);
        assert_eq!(json_body, ResponseBody::Json(json!({ "ok": true })));

        let html = parse_response_body(Some("text/html"), b"<body>hi</body>", StatusCode::OK);
        assert_eq!(html, ResponseBody::Text("<body>hi</body>".into()));

        let untyped = parse_response_body(None, b"plain", StatusCode::OK);
        assert_eq!(untyped, ResponseBody::Text("plain".into()));
    }

    #[test]
    fn empty_bodies_are_not_errors() {
        let json_empty = parse_response_body(Some("application/json"), b"  ", StatusCode::CREATED);
        assert_eq!(json_empty, ResponseBody::Json(json!({})));

        let text_empty = parse_response_body(Some("text/plain"), b"", StatusCode::NO_CONTENT);
        assert_eq!(text_empty, ResponseBody::Empty);
    }

    #[test]
    fn malformed_json_falls_back_to_empty_object() {
        let truncated = parse_response_body(Some("application/json"), b"{\"truncated\":\n", StatusCode::OK);
        assert_eq!(truncated, ResponseBody::Json(json!({})));

        let acknowledgement = parse_response_body(Some("application/json; charset=utf-8"), b"OK", StatusCode::CREATED);
        assert_eq!(acknowledgement, ResponseBody::Json(json!({})));
    }

    #[test]
    fn strict_parse_reports_status_and_preview() {
        let error = parse_response_json_strict("{\"truncated\":\n", Some(StatusCode::OK)).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("status 200 OK"), "{message}");
        assert_eq!(error.body_preview(), "{\"truncated\":");
    }

    #[test]
    fn truncate_response_preview_limits_length() {
        let long = "x".repeat(300);
        let preview = truncate_response_preview(&long, 10);
        assert_eq!(preview, format!("{}...", "x".repeat(10)));
        assert_eq!(truncate_response_preview(" \n", 10), "<empty>");
    }
}
