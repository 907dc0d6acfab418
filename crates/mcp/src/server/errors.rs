//! Structured tool error helpers.
//!
//! Every tool failure carries a `data` payload with a stable `error_code`,
//! a `category`, whether a retry may help, and a suggested next step.

use chrono::Utc;
use da_api::{DaError, Transient};
use da_engine::PublishError;
use rmcp::model::ErrorData;
use serde_json::Value;

fn build_error_data(
    error_code: &str,
    category: &str,
    message: &str,
    context: Value,
    retryable: bool,
    suggested_action: &str,
) -> Value {
    serde_json::json!({
        "error_code": error_code,
        "category": category,
        "message": message,
        "context": context,
        "retryable": retryable,
        "suggested_action": suggested_action,
        "correlation_id": format!("da-{}", Utc::now().timestamp_millis()),
    })
}

pub fn invalid_params_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::invalid_params(
        message.clone(),
        Some(build_error_data(error_code, "validation", &message, context, false, suggested_action)),
    )
}

pub fn not_found_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::resource_not_found(
        message.clone(),
        Some(build_error_data(error_code, "not_found", &message, context, false, suggested_action)),
    )
}

pub fn execution_error(error_code: &str, message: impl Into<String>, context: Value, retryable: bool, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::internal_error(
        message.clone(),
        Some(build_error_data(error_code, "execution", &message, context, retryable, suggested_action)),
    )
}

pub fn internal_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::internal_error(
        message.clone(),
        Some(build_error_data(error_code, "internal", &message, context, false, suggested_action)),
    )
}

/// Map an admin API failure onto a tool error.
pub fn da_error(error: &DaError, context: Value) -> ErrorData {
    let message = error.to_string();
    match error {
        DaError::Path(_) => invalid_params_error(
            "INVALID_PATH",
            message,
            context,
            "Use a path relative to the repository root without '.', '..' or backslashes.",
        ),
        DaError::Status { status: 404, .. } => not_found_error(
            "SOURCE_NOT_FOUND",
            message,
            context,
            "Call source.list on the parent folder to find the correct path.",
        ),
        DaError::Status { status: 401 | 403, .. } => execution_error(
            "AUTHORIZATION_FAILED",
            message,
            context,
            false,
            "Set DA_ADMIN_TOKEN to a token with access to this organization and repository.",
        ),
        DaError::Status { status: 429, .. } => execution_error(
            "RATE_LIMITED",
            message,
            context,
            true,
            "Wait before retrying; the admin API is throttling requests.",
        ),
        DaError::Status { status, .. } => execution_error(
            "HTTP_STATUS_ERROR",
            message,
            context,
            *status >= 500,
            "Inspect the response detail; server errors may succeed on a later attempt.",
        ),
        DaError::Transport(transport) => execution_error(
            "TRANSPORT_ERROR",
            message,
            context_with_kind(context, transport.kind().as_str()),
            error.is_transient(),
            "Check network connectivity to the admin API and retry.",
        ),
        DaError::Url { .. } => internal_error(
            "INVALID_ENDPOINT",
            message,
            context,
            "Check DA_ADMIN_BASE and DA_PIPELINE_BASE.",
        ),
    }
}

/// Map an asset publish workflow failure onto a tool error.
pub fn publish_error(error: &PublishError, context: Value) -> ErrorData {
    let message = error.to_string();
    match error {
        PublishError::InvalidPath(_) => invalid_params_error(
            "INVALID_PATH",
            message,
            context,
            "Use a destination path relative to the repository root without '.', '..' or backslashes.",
        ),
        PublishError::Read { .. } => invalid_params_error(
            "LOCAL_FILE_UNREADABLE",
            message,
            context,
            "Pass an absolute local_path to a readable file on the server host.",
        ),
        PublishError::UploadUnreachable { kind, .. } => execution_error(
            "UPLOAD_UNREACHABLE",
            message,
            context_with_kind(context, kind.as_str()),
            true,
            "Check network connectivity and proxy settings, then retry the upload.",
        ),
        PublishError::Upload { source, .. } => match source {
            DaError::Status { status: 404, .. } => not_found_error(
                "UPLOAD_TARGET_NOT_FOUND",
                message,
                context,
                "Verify the organization and repository names.",
            ),
            other => execution_error(
                "UPLOAD_FAILED",
                message,
                context,
                other.status().is_some_and(|status| status >= 500 || status == 429),
                "Inspect the upload error; fix credentials or path before retrying.",
            ),
        },
    }
}

fn context_with_kind(mut context: Value, kind: &str) -> Value {
    if let Value::Object(map) = &mut context {
        map.insert("transport_kind".to_string(), Value::String(kind.to_string()));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use da_api::{TransportError, TransportErrorKind};
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn data(error: &ErrorData) -> &Value {
        error.data.as_ref().expect("error data")
    }

    #[test]
    fn not_found_status_maps_to_resource_not_found() {
        let error = DaError::Status {
            operation: "get source".into(),
            status: 404,
            detail: "Not Found".into(),
        };

        let mapped = da_error(&error, json!({ "path": "missing.html" }));

        assert_eq!(mapped.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(data(&mapped)["error_code"], "SOURCE_NOT_FOUND");
        assert_eq!(data(&mapped)["context"]["path"], "missing.html");
        assert_eq!(data(&mapped)["retryable"], false);
    }

    #[test]
    fn transient_transport_errors_are_retryable() {
        let error = DaError::from(TransportError::new(TransportErrorKind::Timeout, "deadline elapsed"));

        let mapped = da_error(&error, json!({}));

        assert_eq!(mapped.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(data(&mapped)["retryable"], true);
        assert_eq!(data(&mapped)["context"]["transport_kind"], "timeout");
        assert!(data(&mapped)["correlation_id"].as_str().unwrap().starts_with("da-"));
    }

    #[test]
    fn server_errors_are_retryable_but_client_errors_are_not() {
        let status = |status| DaError::Status {
            operation: "trigger preview".into(),
            status,
            detail: String::new(),
        };
        assert_eq!(data(&da_error(&status(503), json!({})))["retryable"], true);
        assert_eq!(data(&da_error(&status(400), json!({})))["retryable"], false);
        assert_eq!(data(&da_error(&status(401), json!({})))["error_code"], "AUTHORIZATION_FAILED");
    }

    #[test]
    fn unreadable_local_file_is_invalid_params() {
        let error = PublishError::Read {
            path: "/tmp/missing.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };

        let mapped = publish_error(&error, json!({ "local_path": "/tmp/missing.png" }));

        assert_eq!(mapped.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(data(&mapped)["error_code"], "LOCAL_FILE_UNREADABLE");
        assert_eq!(data(&mapped)["category"], "validation");
    }
}
