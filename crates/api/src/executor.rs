//! Retrying request execution with status checking and body parsing.

use da_types::ResponseBody;
use da_util::http::parse_response_body;

use crate::error::DaError;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::transport::{AdminRequest, AdminResponse, AdminTransport};

/// Send `request` under `policy`, converting non-2xx responses into
/// [`DaError::Status`].
///
/// The request is cloned for each attempt. Status errors are permanent, so
/// only transport failures are retried.
pub async fn send_checked(
    transport: &dyn AdminTransport,
    operation: &str,
    policy: RetryPolicy,
    request: AdminRequest,
) -> Result<AdminResponse, DaError> {
    retry_with_backoff(policy, operation, || {
        let request = request.clone();
        async move {
            let response = transport.execute(request).await?;
            if !response.is_success() {
                return Err(DaError::from_status(operation, &response));
            }
            Ok(response)
        }
    })
    .await
}

/// Like [`send_checked`], then parse the body by its declared content type.
///
/// A body that claims JSON but does not parse becomes an empty object rather
/// than an error.
pub async fn fetch_body(
    transport: &dyn AdminTransport,
    operation: &str,
    policy: RetryPolicy,
    request: AdminRequest,
) -> Result<ResponseBody, DaError> {
    let response = send_checked(transport, operation, policy, request).await?;
    Ok(parse_response_body(response.content_type.as_deref(), &response.body, response.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportErrorKind};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use url::Url;

    struct QueueTransport {
        replies: Mutex<VecDeque<Result<AdminResponse, TransportError>>>,
        calls: Mutex<u32>,
    }

    impl QueueTransport {
        fn new(replies: Vec<Result<AdminResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl AdminTransport for QueueTransport {
        async fn execute(&self, _request: AdminRequest) -> Result<AdminResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new(TransportErrorKind::Other, "no scripted reply")))
        }
    }

    fn reply(status: u16, content_type: &str, body: &str) -> Result<AdminResponse, TransportError> {
        Ok(AdminResponse {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
        })
    }

    fn network_error() -> Result<AdminResponse, TransportError> {
        Err(TransportError::new(TransportErrorKind::Network, "Network error"))
    }

    fn request() -> AdminRequest {
        AdminRequest::get(Url::parse("https://admin.da.live/source/acme/site/index.html").unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_body_retries_network_errors_then_parses_json() {
        let transport = QueueTransport::new(vec![network_error(), network_error(), reply(200, "application/json", r#"{"ok":true}"#)]);

        let body = fetch_body(&transport, "get source", RetryPolicy::default(), request()).await.unwrap();

        assert_eq!(transport.calls(), 3);
        assert_eq!(body, ResponseBody::Json(json!({ "ok": true })));
    }

    #[tokio::test(start_paused = true)]
    async fn status_errors_are_not_retried() {
        let transport = QueueTransport::new(vec![reply(500, "text/plain", "boom"), reply(200, "text/plain", "late")]);

        let error = send_checked(&transport, "get source", RetryPolicy::default(), request())
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 1);
        assert_eq!(error.status(), Some(500));
    }

    #[tokio::test]
    async fn malformed_json_reads_as_empty_object() {
        let transport = QueueTransport::new(vec![reply(200, "application/json", "{not json")]);

        let body = fetch_body(&transport, "list sources", RetryPolicy::no_retry(), request()).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(body, ResponseBody::Json(json!({})));
    }
}
