//! Local byte sources for asset uploads.

use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Reads the raw bytes of an asset before upload.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads assets from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSource;

#[async_trait]
impl AssetSource for LocalFileSource {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
