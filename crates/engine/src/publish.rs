//! Asset publish workflow: local read, upload, preview, publish.
//!
//! The read and the upload are fatal: if either fails the caller gets an
//! error and no result. Preview and publish are best effort; their failures
//! are logged and reported as [`StepOutcome::Skipped`] in the
//! [`UploadResult`]. Each trigger is followed by a settle delay so the
//! pipeline can pick up the new revision before the next step runs.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use da_api::{
    AdminRequest, AdminTransport, DaError, Endpoints, MultipartFile, RequestBody, RetryPolicy, Transient,
    TransportErrorKind, send_checked,
};
use da_types::{ResourceLocation, StepOutcome, UploadResult};
use da_util::{PathError, content_type_for_path, normalize_resource_path};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::asset_source::AssetSource;
use crate::content::SOURCE_FIELD;

/// Retry budgets and settle delays for each workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSettings {
    pub upload: RetryPolicy,
    pub pipeline: RetryPolicy,
    pub preview_settle: Duration,
    pub publish_settle: Duration,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            upload: RetryPolicy::new(3, 1000),
            pipeline: RetryPolicy::new(2, 500),
            preview_settle: Duration::from_millis(1000),
            publish_settle: Duration::from_millis(800),
        }
    }
}

/// What to upload and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAssetRequest {
    /// Remote destination; `path` is normalized before use.
    pub location: ResourceLocation,
    /// File to read the bytes from.
    pub local_path: PathBuf,
    /// Overrides extension-based detection when set.
    pub content_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("could not read local asset '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Failed to upload asset to {target}: {kind} failure persisted after {attempts} attempts. \
         Probable causes: TLS handshake failure, lost network connectivity or proxy interference, \
         rate limiting by the admin API, or too many concurrent connections. Last error: {source}"
    )]
    UploadUnreachable {
        target: String,
        attempts: u32,
        kind: TransportErrorKind,
        #[source]
        source: DaError,
    },

    #[error("Failed to upload asset to {target}: {source}")]
    Upload {
        target: String,
        #[source]
        source: DaError,
    },
}

impl PublishError {
    /// The underlying admin API error for upload failures.
    pub fn api_error(&self) -> Option<&DaError> {
        match self {
            PublishError::UploadUnreachable { source, .. } | PublishError::Upload { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Runs the upload → preview → publish workflow.
#[derive(Clone)]
pub struct AssetPublisher {
    transport: Arc<dyn AdminTransport>,
    source: Arc<dyn AssetSource>,
    endpoints: Endpoints,
    settings: PublishSettings,
}

impl AssetPublisher {
    pub fn new(transport: Arc<dyn AdminTransport>, source: Arc<dyn AssetSource>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            source,
            endpoints,
            settings: PublishSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PublishSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn upload_asset(&self, request: &UploadAssetRequest) -> Result<UploadResult, PublishError> {
        let path = normalize_resource_path(&request.location.path)?;
        let location = request.location.with_path(path.clone());
        let content_type = resolve_content_type(request.content_type.as_deref(), &path, &request.local_path);

        let bytes = self
            .source
            .read(&request.local_path)
            .await
            .map_err(|source| PublishError::Read {
                path: request.local_path.clone(),
                source,
            })?;
        let size = bytes.len() as u64;
        debug!(location = %location, size, content_type = %content_type, "asset read");

        self.upload(&location, &content_type, bytes).await?;
        info!(location = %location, size, "asset uploaded");

        let preview = self.trigger_step("trigger preview", self.endpoints.preview(&location)).await;
        tokio::time::sleep(self.settings.preview_settle).await;

        let publish = self.trigger_step("trigger publish", self.endpoints.publish(&location)).await;
        tokio::time::sleep(self.settings.publish_settle).await;

        info!(
            location = %location,
            preview = preview.is_completed(),
            publish = publish.is_completed(),
            "asset publish workflow finished"
        );
        Ok(UploadResult {
            success: true,
            preview_url: self.endpoints.public_preview_url(&location),
            live_url: self.endpoints.public_live_url(&location),
            path,
            content_type,
            size,
            preview,
            publish,
        })
    }

    async fn upload(&self, location: &ResourceLocation, content_type: &str, bytes: Vec<u8>) -> Result<(), PublishError> {
        let target = location.to_string();
        let wrap = |source: DaError| classify_upload_failure(target.clone(), self.settings.upload, source);

        let url = self.endpoints.source(location).map_err(wrap)?;
        let file = MultipartFile {
            field: SOURCE_FIELD.to_string(),
            file_name: location.file_name().unwrap_or("asset").to_string(),
            content_type: content_type.to_string(),
            bytes,
        };
        let request = AdminRequest::post(url, RequestBody::Multipart(file));
        send_checked(self.transport.as_ref(), "upload asset", self.settings.upload, request)
            .await
            .map_err(wrap)?;
        Ok(())
    }

    async fn trigger_step(&self, operation: &str, url: Result<url::Url, DaError>) -> StepOutcome {
        let result = match url {
            Ok(url) => {
                let request = AdminRequest::post(url, RequestBody::Empty);
                send_checked(self.transport.as_ref(), operation, self.settings.pipeline, request).await
            }
            Err(error) => Err(error),
        };
        match result {
            Ok(_) => StepOutcome::Completed,
            Err(error) => {
                warn!(operation, error = %error, "pipeline step skipped");
                StepOutcome::skipped(error.to_string())
            }
        }
    }
}

fn classify_upload_failure(target: String, policy: RetryPolicy, source: DaError) -> PublishError {
    match source.transport_kind() {
        Some(kind) if source.is_transient() => PublishError::UploadUnreachable {
            target,
            attempts: policy.max_attempts(),
            kind,
            source,
        },
        _ => PublishError::Upload { target, source },
    }
}

/// Explicit value, then the remote path's extension, then the local file's.
fn resolve_content_type(explicit: Option<&str>, remote_path: &str, local_path: &Path) -> String {
    if let Some(explicit) = explicit.map(str::trim).filter(|value| !value.is_empty()) {
        return explicit.to_string();
    }
    let from_remote = content_type_for_path(remote_path);
    if from_remote != da_util::DEFAULT_CONTENT_TYPE {
        return from_remote.to_string();
    }
    let local_name = local_path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    content_type_for_path(local_name).to_string()
}
