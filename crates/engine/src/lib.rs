//! Content operations and the asset publish workflow.
//!
//! [`ContentService`] wraps the document-level admin routes (list, read,
//! create, delete, copy, move, versions, preview, publish). Every call goes
//! through the retrying executor in `da-api` and returns a parsed
//! [`da_types::ResponseBody`].
//!
//! [`AssetPublisher`] runs the multi-step workflow that reads a local file,
//! uploads it, and then triggers preview and publish on a best-effort basis.

mod asset_source;
mod content;
mod publish;
#[cfg(test)]
mod testing;

pub use asset_source::{AssetSource, LocalFileSource};
pub use content::ContentService;
pub use publish::{AssetPublisher, PublishError, PublishSettings, UploadAssetRequest};
