//! Object storage port for user-uploaded media.

use async_trait::async_trait;

/// A file to upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    /// Destination folder in the bucket, e.g. `posts`.
    pub folder: String,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store the file and return its public URL.
    async fn upload(&self, upload: MediaUpload) -> Result<String, MediaError>;

    /// Delete the object behind a public URL. Deleting an object that no
    /// longer exists succeeds.
    async fn delete(&self, url: &str) -> Result<(), MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media storage is not configured")]
    NotConfigured,

    #[error("Unrecognised media URL: {0}")]
    InvalidUrl(String),

    #[error("Storage request failed: {0}")]
    Request(String),

    #[error("Storage rejected the request: {0}")]
    Rejected(String),
}
