//! Document-level operations against the content admin API.
//!
//! Every operation normalizes the caller's path, resolves the endpoint and
//! goes through the retrying executor with the service's [`RetryPolicy`].

use std::sync::Arc;

use da_api::{AdminRequest, AdminTransport, DaError, Endpoints, MultipartFile, RequestBody, RetryPolicy, fetch_body};
use da_types::{ResourceLocation, ResponseBody};
use da_util::{document_content_type, normalize_resource_path};
use tracing::info;

/// Multipart field the source endpoint reads uploaded content from.
pub(crate) const SOURCE_FIELD: &str = "data";

/// Read, write and reorganize documents.
#[derive(Clone)]
pub struct ContentService {
    transport: Arc<dyn AdminTransport>,
    endpoints: Endpoints,
    policy: RetryPolicy,
}

impl ContentService {
    pub fn new(transport: Arc<dyn AdminTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// List the entries of a folder. A missing or empty path lists the repository root.
    pub async fn list(&self, org: &str, repo: &str, path: Option<&str>) -> Result<ResponseBody, DaError> {
        let path = match path.map(str::trim).filter(|path| !path.trim_matches('/').is_empty()) {
            Some(path) => normalize_resource_path(path)?,
            None => String::new(),
        };
        let location = ResourceLocation::new(org, repo, path);
        let url = self.endpoints.list(&location)?;
        self.fetch("list sources", AdminRequest::get(url)).await
    }

    pub async fn get(&self, location: &ResourceLocation) -> Result<ResponseBody, DaError> {
        let location = normalized(location)?;
        let url = self.endpoints.source(&location)?;
        self.fetch("get source", AdminRequest::get(url)).await
    }

    /// Create or overwrite a document.
    ///
    /// Without an explicit content type, `.json` paths are sent as JSON and
    /// everything else as HTML.
    pub async fn create(
        &self,
        location: &ResourceLocation,
        content: &str,
        content_type: Option<&str>,
    ) -> Result<ResponseBody, DaError> {
        let location = normalized(location)?;
        let content_type = content_type
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| document_content_type(&location.path))
            .to_string();
        let file = MultipartFile {
            field: SOURCE_FIELD.to_string(),
            file_name: location.file_name().unwrap_or("index.html").to_string(),
            content_type,
            bytes: content.as_bytes().to_vec(),
        };
        let url = self.endpoints.source(&location)?;
        let body = self
            .fetch("create source", AdminRequest::post(url, RequestBody::Multipart(file)))
            .await?;
        info!(location = %location, size = content.len(), "source created");
        Ok(body)
    }

    pub async fn delete(&self, location: &ResourceLocation) -> Result<ResponseBody, DaError> {
        let location = normalized(location)?;
        let url = self.endpoints.source(&location)?;
        let body = self.fetch("delete source", AdminRequest::delete(url)).await?;
        info!(location = %location, "source deleted");
        Ok(body)
    }

    /// Copy a document or folder within the same repository.
    pub async fn copy(&self, source: &ResourceLocation, destination_path: &str) -> Result<ResponseBody, DaError> {
        let (source, destination) = self.relocation(source, destination_path)?;
        let url = self.endpoints.copy(&source)?;
        self.fetch("copy source", AdminRequest::post(url, destination_form(&destination)))
            .await
    }

    /// Move a document or folder within the same repository.
    pub async fn move_to(&self, source: &ResourceLocation, destination_path: &str) -> Result<ResponseBody, DaError> {
        let (source, destination) = self.relocation(source, destination_path)?;
        let url = self.endpoints.move_to(&source)?;
        self.fetch("move source", AdminRequest::post(url, destination_form(&destination)))
            .await
    }

    pub async fn versions(&self, location: &ResourceLocation) -> Result<ResponseBody, DaError> {
        let location = normalized(location)?;
        let url = self.endpoints.versions(&location)?;
        self.fetch("list versions", AdminRequest::get(url)).await
    }

    /// Trigger a preview build. Failures are returned to the caller.
    pub async fn preview(&self, location: &ResourceLocation) -> Result<ResponseBody, DaError> {
        let location = normalized(location)?;
        let url = self.endpoints.preview(&location)?;
        self.fetch("trigger preview", AdminRequest::post(url, RequestBody::Empty))
            .await
    }

    /// Publish previously previewed content. Failures are returned to the caller.
    pub async fn publish(&self, location: &ResourceLocation) -> Result<ResponseBody, DaError> {
        let location = normalized(location)?;
        let url = self.endpoints.publish(&location)?;
        self.fetch("trigger publish", AdminRequest::post(url, RequestBody::Empty))
            .await
    }

    fn relocation(
        &self,
        source: &ResourceLocation,
        destination_path: &str,
    ) -> Result<(ResourceLocation, ResourceLocation), DaError> {
        let source = normalized(source)?;
        let destination = source.with_path(normalize_resource_path(destination_path)?);
        Ok((source, destination))
    }

    async fn fetch(&self, operation: &str, request: AdminRequest) -> Result<ResponseBody, DaError> {
        fetch_body(self.transport.as_ref(), operation, self.policy, request).await
    }
}

pub(crate) fn normalized(location: &ResourceLocation) -> Result<ResourceLocation, DaError> {
    Ok(location.with_path(normalize_resource_path(&location.path)?))
}

/// The admin API expects the destination as an absolute `/{org}/{repo}/{path}`.
fn destination_form(destination: &ResourceLocation) -> RequestBody {
    RequestBody::Form(vec![("destination".to_string(), format!("/{destination}"))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use da_api::{DaConfig, TransportErrorKind};
    use reqwest::Method;
    use serde_json::json;

    fn service(transport: Arc<ScriptedTransport>) -> ContentService {
        ContentService::new(transport, Endpoints::new(&DaConfig::default()))
    }

    #[tokio::test]
    async fn get_returns_text_for_html_documents() {
        let transport = Arc::new(ScriptedTransport::new().reply("source", 200, "text/html", "<main>hello</main>"));

        let body = service(Arc::clone(&transport))
            .get(&ResourceLocation::new("acme", "site", "/index.html"))
            .await
            .unwrap();

        assert_eq!(body, ResponseBody::Text("<main>hello</main>".into()));
        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].url.path(), "/source/acme/site/index.html");
    }

    #[tokio::test]
    async fn list_defaults_to_repository_root() {
        let transport = Arc::new(ScriptedTransport::new().reply("list", 200, "application/json", r#"[{"name":"index"}]"#));

        let body = service(Arc::clone(&transport)).list("acme", "site", Some("/")).await.unwrap();

        assert_eq!(body, ResponseBody::Json(json!([{ "name": "index" }])));
        assert_eq!(transport.requests()[0].url.path(), "/list/acme/site");
    }

    #[tokio::test]
    async fn create_uploads_html_as_multipart_data() {
        let transport = Arc::new(ScriptedTransport::new().reply("source", 201, "application/json", ""));

        let body = service(Arc::clone(&transport))
            .create(&ResourceLocation::new("acme", "site", "blog/post.html"), "<body></body>", None)
            .await
            .unwrap();

        assert_eq!(body, ResponseBody::Json(json!({})));
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        match &request.body {
            RequestBody::Multipart(file) => {
                assert_eq!(file.field, "data");
                assert_eq!(file.file_name, "post.html");
                assert_eq!(file.content_type, "text/html");
                assert_eq!(file.bytes, b"<body></body>");
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_tolerates_plain_acknowledgement_labelled_json() {
        let transport = Arc::new(ScriptedTransport::new().reply("source", 201, "application/json", "OK"));

        let body = service(Arc::clone(&transport))
            .create(&ResourceLocation::new("acme", "site", "index.html"), "<body></body>", None)
            .await
            .unwrap();

        assert_eq!(body, ResponseBody::Json(json!({})));
        assert_eq!(transport.calls_to("source"), 1);
    }

    #[tokio::test]
    async fn copy_and_move_send_absolute_destination() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("copy", 204, "text/plain", "")
                .reply("move", 204, "text/plain", ""),
        );
        let service = service(Arc::clone(&transport));
        let source = ResourceLocation::new("acme", "site", "docs/a.html");

        service.copy(&source, "docs/b.html").await.unwrap();
        service.move_to(&source, "/archive/a.html").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url.path(), "/copy/acme/site/docs/a.html");
        assert_eq!(
            requests[0].body,
            RequestBody::Form(vec![("destination".into(), "/acme/site/docs/b.html".into())])
        );
        assert_eq!(requests[1].url.path(), "/move/acme/site/docs/a.html");
        assert_eq!(
            requests[1].body,
            RequestBody::Form(vec![("destination".into(), "/acme/site/archive/a.html".into())])
        );
    }

    #[tokio::test]
    async fn invalid_paths_fail_before_any_request() {
        let transport = Arc::new(ScriptedTransport::new());

        let error = service(Arc::clone(&transport))
            .delete(&ResourceLocation::new("acme", "site", "../secrets"))
            .await
            .unwrap_err();

        assert!(matches!(error, DaError::Path(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn direct_publish_propagates_failures() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .fail("live", TransportErrorKind::Timeout, "timed out")
                .reply("live", 502, "text/plain", "bad gateway"),
        );

        let error = service(Arc::clone(&transport))
            .publish(&ResourceLocation::new("acme", "site", "index.html"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(502));
        assert_eq!(transport.calls_to("live"), 2);
    }

    #[tokio::test]
    async fn versions_use_versionlist_route() {
        let transport = Arc::new(ScriptedTransport::new().reply("versionlist", 200, "application/json", "[]"));

        service(Arc::clone(&transport))
            .versions(&ResourceLocation::new("acme", "site", "index.html"))
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].url.path(), "/versionlist/acme/site/index.html");
    }
}
