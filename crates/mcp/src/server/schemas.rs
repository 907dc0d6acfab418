use std::path::PathBuf;

use da_engine::UploadAssetRequest;
use da_types::ResourceLocation;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for folder listings.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListSourcesRequest {
    #[schemars(description = "Organization name, for example 'acme'.")]
    pub org: String,
    #[schemars(description = "Repository (site) name, for example 'site'.")]
    pub repo: String,
    /// Folder to list. Omitted or empty lists the repository root.
    #[schemars(description = "Folder path relative to the repository root, for example 'blog/2024'. Omit to list the root.")]
    pub path: Option<String>,
}

/// Parameters addressing a single document or asset.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRequest {
    #[schemars(description = "Organization name, for example 'acme'.")]
    pub org: String,
    #[schemars(description = "Repository (site) name, for example 'site'.")]
    pub repo: String,
    #[schemars(description = "Resource path relative to the repository root, for example 'blog/post.html'.")]
    pub path: String,
}

impl SourceRequest {
    pub fn location(&self) -> ResourceLocation {
        ResourceLocation::new(&self.org, &self.repo, &self.path)
    }
}

/// Parameters for creating or overwriting a document.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateSourceRequest {
    #[schemars(description = "Organization name, for example 'acme'.")]
    pub org: String,
    #[schemars(description = "Repository (site) name, for example 'site'.")]
    pub repo: String,
    #[schemars(description = "Document path including extension, for example 'blog/post.html' or 'config/nav.json'.")]
    pub path: String,
    #[schemars(description = "Full document body. HTML for .html documents, JSON text for .json documents.")]
    pub content: String,
    #[schemars(description = "Optional content type override. Defaults to application/json for .json paths and text/html otherwise.")]
    pub content_type: Option<String>,
}

impl CreateSourceRequest {
    pub fn location(&self) -> ResourceLocation {
        ResourceLocation::new(&self.org, &self.repo, &self.path)
    }
}

/// Parameters for copy and move.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelocateSourceRequest {
    #[schemars(description = "Organization name, for example 'acme'.")]
    pub org: String,
    #[schemars(description = "Repository (site) name, for example 'site'.")]
    pub repo: String,
    #[schemars(description = "Existing resource path, for example 'drafts/post.html'.")]
    pub path: String,
    #[schemars(description = "Destination path in the same repository, for example 'blog/post.html'.")]
    pub destination: String,
}

impl RelocateSourceRequest {
    pub fn location(&self) -> ResourceLocation {
        ResourceLocation::new(&self.org, &self.repo, &self.path)
    }
}

/// Parameters for the asset publish workflow.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadAssetParams {
    #[schemars(description = "Organization name, for example 'acme'.")]
    pub org: String,
    #[schemars(description = "Repository (site) name, for example 'site'.")]
    pub repo: String,
    #[schemars(description = "Destination path for the asset, for example 'assets/img.png'.")]
    pub path: String,
    #[schemars(description = "Absolute path of the local file to upload.")]
    pub local_path: String,
    #[schemars(description = "Optional content type override. Detected from the file extension when omitted.")]
    pub content_type: Option<String>,
}

impl From<UploadAssetParams> for UploadAssetRequest {
    fn from(params: UploadAssetParams) -> Self {
        UploadAssetRequest {
            location: ResourceLocation::new(params.org, params.repo, params.path),
            local_path: PathBuf::from(params.local_path),
            content_type: params.content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_request_path_is_optional() {
        let request: ListSourcesRequest = serde_json::from_value(json!({ "org": "acme", "repo": "site" })).unwrap();
        assert_eq!(request.path, None);
    }

    #[test]
    fn upload_params_convert_to_engine_request() {
        let params: UploadAssetParams = serde_json::from_value(json!({
            "org": "acme",
            "repo": "site",
            "path": "assets/img.png",
            "local_path": "/tmp/img.png"
        }))
        .unwrap();

        let request = UploadAssetRequest::from(params);
        assert_eq!(request.location, ResourceLocation::new("acme", "site", "assets/img.png"));
        assert_eq!(request.local_path, PathBuf::from("/tmp/img.png"));
        assert_eq!(request.content_type, None);
    }

    #[test]
    fn schema_marks_required_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(RelocateSourceRequest)).unwrap();
        let required = schema["required"].as_array().unwrap();
        for field in ["org", "repo", "path", "destination"] {
            assert!(required.contains(&json!(field)), "{field} should be required");
        }
    }
}
