use std::sync::Arc;

use anyhow::{Context, Result};
use da_api::{AdminTransport, DaClient, DaConfig, Endpoints};
use da_engine::{AssetPublisher, AssetSource, ContentService, LocalFileSource, UploadAssetRequest};
use da_types::ResponseBody;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::server::errors::{da_error, publish_error};
use crate::server::schemas::{CreateSourceRequest, ListSourcesRequest, RelocateSourceRequest, SourceRequest, UploadAssetParams};

/// Shared services for MCP tool handlers.
#[derive(Clone)]
pub struct DaToolServices {
    content: ContentService,
    publisher: AssetPublisher,
}

impl DaToolServices {
    /// Build services over the HTTP client described by `config`.
    pub fn from_config(config: &DaConfig) -> Result<Self> {
        let client = DaClient::new(config).context("failed to build DA admin client")?;
        Ok(Self::new(Arc::new(client), Arc::new(LocalFileSource), Endpoints::new(config)))
    }

    pub fn new(transport: Arc<dyn AdminTransport>, source: Arc<dyn AssetSource>, endpoints: Endpoints) -> Self {
        Self {
            content: ContentService::new(Arc::clone(&transport), endpoints.clone()),
            publisher: AssetPublisher::new(transport, source, endpoints),
        }
    }

    pub fn content(&self) -> &ContentService {
        &self.content
    }

    pub fn publisher(&self) -> &AssetPublisher {
        &self.publisher
    }
}

#[derive(Clone)]
pub struct DaMcpCore {
    tool_router: ToolRouter<Self>,
    services: Arc<DaToolServices>,
}

#[tool_router]
impl DaMcpCore {
    /// Create a new MCP core handler with shared service dependencies.
    pub fn new(services: Arc<DaToolServices>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            services,
        }
    }

    #[tool(
        name = "source.list",
        annotations(read_only_hint = true),
        description = "List documents, assets and folders in a repository folder. Input: org, repo, path? (folder; omit for the repository root). Returns the admin API listing."
    )]
    async fn source_list(&self, param: Parameters<ListSourcesRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .list(&request.org, &request.repo, request.path.as_deref())
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("source.list", request, body))
    }

    #[tool(
        name = "source.get",
        annotations(read_only_hint = true),
        description = "Read one document or asset. Input: org, repo, path. Returns parsed JSON for JSON documents or {content} for HTML and text."
    )]
    async fn source_get(&self, param: Parameters<SourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .get(&request.location())
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("source.get", request, body))
    }

    #[tool(
        name = "source.create",
        annotations(open_world_hint = true),
        description = "Create or overwrite a document. Input: org, repo, path (with extension), content, content_type?. .json paths are stored as JSON, everything else as HTML. Overwrites existing content without confirmation."
    )]
    async fn source_create(&self, param: Parameters<CreateSourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let context = json!({ "org": request.org, "repo": request.repo, "path": request.path, "size": request.content.len() });
        let body = self
            .services
            .content
            .create(&request.location(), &request.content, request.content_type.as_deref())
            .await
            .map_err(|error| da_error(&error, context.clone()))?;
        Ok(self.respond("source.create", &context, body))
    }

    #[tool(
        name = "source.delete",
        annotations(destructive_hint = true, open_world_hint = true),
        description = "Delete a document or asset. Input: org, repo, path. Irreversible; confirm the path with source.get or source.list first."
    )]
    async fn source_delete(&self, param: Parameters<SourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .delete(&request.location())
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("source.delete", request, body))
    }

    #[tool(
        name = "source.copy",
        annotations(open_world_hint = true),
        description = "Copy a document or folder to another path in the same repository. Input: org, repo, path, destination."
    )]
    async fn source_copy(&self, param: Parameters<RelocateSourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .copy(&request.location(), &request.destination)
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("source.copy", request, body))
    }

    #[tool(
        name = "source.move",
        annotations(open_world_hint = true),
        description = "Move or rename a document or folder within the same repository. Input: org, repo, path, destination."
    )]
    async fn source_move(&self, param: Parameters<RelocateSourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .move_to(&request.location(), &request.destination)
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("source.move", request, body))
    }

    #[tool(
        name = "source.versions",
        annotations(read_only_hint = true),
        description = "List saved versions of a document. Input: org, repo, path."
    )]
    async fn source_versions(&self, param: Parameters<SourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .versions(&request.location())
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("source.versions", request, body))
    }

    #[tool(
        name = "asset.upload",
        annotations(open_world_hint = true),
        description = "Upload a local file as an asset, then trigger preview and publish. Input: org, repo, path (destination, e.g. assets/img.png), local_path, content_type?. Upload failures abort; preview/publish failures are reported as skipped steps with success still true. Returns success, path, previewUrl, liveUrl, contentType, size, preview, publish."
    )]
    async fn asset_upload(&self, param: Parameters<UploadAssetParams>) -> Result<CallToolResult, ErrorData> {
        let context = request_context(&param.0);
        let request = UploadAssetRequest::from(param.0);
        let result = self
            .services
            .publisher
            .upload_asset(&request)
            .await
            .map_err(|error| publish_error(&error, context.clone()))?;
        let structured = serde_json::to_value(&result)
            .map_err(|error| ErrorData::internal_error(error.to_string(), None))?;
        debug!(tool = "asset.upload", request = %context, "tool call completed");
        Ok(CallToolResult::structured(structured))
    }

    #[tool(
        name = "content.preview",
        annotations(open_world_hint = true),
        description = "Trigger a preview build for a document or asset already stored in the repository. Input: org, repo, path. Fails if the pipeline rejects the request."
    )]
    async fn content_preview(&self, param: Parameters<SourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .preview(&request.location())
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("content.preview", request, body))
    }

    #[tool(
        name = "content.publish",
        annotations(open_world_hint = true),
        description = "Publish previewed content to the live site. Input: org, repo, path. Call content.preview first; fails if the pipeline rejects the request."
    )]
    async fn content_publish(&self, param: Parameters<SourceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = &param.0;
        let body = self
            .services
            .content
            .publish(&request.location())
            .await
            .map_err(|error| da_error(&error, request_context(request)))?;
        Ok(self.respond("content.publish", request, body))
    }

    fn respond(&self, tool_name: &str, request: &impl serde::Serialize, body: ResponseBody) -> CallToolResult {
        debug!(tool = tool_name, request = %request_context(request), "tool call completed");
        CallToolResult::structured(structured_body(body))
    }
}

/// Structured content must be an object, so bare arrays and scalars are
/// wrapped under `items`.
fn structured_body(body: ResponseBody) -> Value {
    match body.into_json() {
        object @ Value::Object(_) => object,
        other => json!({ "items": other }),
    }
}

fn request_context(request: &impl serde::Serialize) -> Value {
    serde_json::to_value(request).unwrap_or(Value::Null)
}

#[tool_handler]
impl ServerHandler for DaMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "da-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("DA Content Admin MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "LLM-ONLY SERVER INSTRUCTIONS.\nADDRESSING:\n- Every tool takes org and repo plus a path relative to the repository root (no leading '..').\nREADING:\n- source.list to browse folders, source.get to read, source.versions for history.\nWRITING:\n- source.create writes HTML or JSON documents; source.copy/source.move relocate within a repository; source.delete is irreversible.\nASSETS:\n- asset.upload reads a local file, uploads it, then previews and publishes it. Check the preview/publish fields: 'skipped' means the asset is stored but not yet visible.\nPIPELINE:\n- content.preview then content.publish to make edited documents visible.\nERRORS:\n- error data carries error_code, retryable and suggested_action; only retry when retryable is true.".to_string(),
            ),
        }
    }
}

/// Serve the tool set over stdin/stdout until the client disconnects.
pub async fn serve_stdio(services: Arc<DaToolServices>) -> Result<()> {
    info!("starting MCP server on stdio");
    let running = DaMcpCore::new(services)
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP stdio server")?;
    running.waiting().await.context("MCP stdio server terminated abnormally")?;
    info!("MCP stdio session closed");
    Ok(())
}
