//! Result types for the asset publish workflow.

use serde::{Deserialize, Serialize};

/// Outcome of a non-fatal workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The remote call returned a 2xx response.
    Completed,
    /// The step failed or was not attempted; the workflow continued without it.
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StepOutcome::Skipped { reason: reason.into() }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

/// Result returned once an asset has been stored remotely.
///
/// `success` is true whenever the upload itself succeeded, regardless of the
/// preview and publish outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    pub path: String,
    pub preview_url: String,
    pub live_url: String,
    pub content_type: String,
    pub size: u64,
    pub preview: StepOutcome,
    pub publish: StepOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_result_uses_camel_case_keys() {
        let result = UploadResult {
            success: true,
            path: "assets/img.png".into(),
            preview_url: "https://main--site--acme.aem.page/assets/img.png".into(),
            live_url: "https://main--site--acme.aem.live/assets/img.png".into(),
            content_type: "image/png".into(),
            size: 42,
            preview: StepOutcome::Completed,
            publish: StepOutcome::skipped("HTTP 502"),
        };

        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["previewUrl"], json!("https://main--site--acme.aem.page/assets/img.png"));
        assert_eq!(value["contentType"], json!("image/png"));
        assert_eq!(value["preview"], json!({ "status": "completed" }));
        assert_eq!(value["publish"], json!({ "status": "skipped", "reason": "HTTP 502" }));
    }
}
