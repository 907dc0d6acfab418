//! Content-type resolution from file extensions.

use std::path::Path;

/// Fallback for extensions missing from the asset table.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const ASSET_CONTENT_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
];

/// Resolve the MIME type of an asset from its file name.
///
/// Matching is case-insensitive on the final extension. Unknown or missing
/// extensions resolve to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for_path(path: &str) -> &'static str {
    let Some(extension) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };
    ASSET_CONTENT_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(extension))
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Content type for authored documents: JSON sheets or HTML pages.
pub fn document_content_type(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => "application/json",
        _ => "text/html",
    }
}
