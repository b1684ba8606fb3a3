//! Image storage for valid names.
//!
//! A valid name references its image by a path (local relative path or remote
//! URL) and, for remote providers, a provider-assigned public id.

pub mod cloudinary;
pub mod local;

pub use cloudinary::CloudinaryImageStore;
pub use local::LocalImageStore;

use crate::errors::{Error, Result};
use async_trait::async_trait;

/// An image received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name, if the client sent one
    pub file_name: Option<String>,
    /// Declared MIME type, if any
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Rejects empty files and non-image content types.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(Error::validation("No image provided"));
        }
        match &self.content_type {
            Some(content_type) if !content_type.starts_with("image/") => {
                Err(Error::validation(format!(
                    "Unsupported content type: {content_type}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Lower-cased extension of the original file name, with the leading dot.
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// Where an image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Local relative path or remote URL
    pub path: String,
    /// Provider-assigned identifier, for remote backends
    pub public_id: Option<String>,
}

/// Backend that stores and removes images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists an upload and returns its reference.
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage>;

    /// Removes a previously stored image. Removing an image that is already gone is not an error.
    async fn remove(&self, image: &StoredImage) -> Result<()>;
}
