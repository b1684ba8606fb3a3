//! Images written to a directory on local disk and served under `/uploads`.

use super::{ImageStore, ImageUpload, StoredImage};
use crate::errors::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// URL prefix under which the upload directory is served
pub const PUBLIC_PREFIX: &str = "/uploads";

const MEDICINE_DIR: &str = "medicines";

/// Stores images under `<root>/medicines/`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    /// Creates a store rooted at the upload directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn medicine_dir(&self) -> PathBuf {
        self.root.join(MEDICINE_DIR)
    }

    /// Maps a public path back to a file inside the medicine directory.
    ///
    /// Only the final path component is used, so a stored path can never point
    /// outside the upload directory.
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix(PUBLIC_PREFIX)?;
        let relative = relative
            .trim_start_matches('/')
            .strip_prefix(MEDICINE_DIR)?
            .strip_prefix('/')?;
        let file_name = Path::new(relative).file_name()?;
        Some(self.medicine_dir().join(file_name))
    }
}

fn unique_file_name(extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{millis}-{}{extension}", &random[..9])
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage> {
        let dir = self.medicine_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = unique_file_name(&upload.extension());
        tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;
        info!("Stored image {} ({} bytes)", file_name, upload.bytes.len());

        Ok(StoredImage {
            path: format!("{PUBLIC_PREFIX}/{MEDICINE_DIR}/{file_name}"),
            public_id: None,
        })
    }

    async fn remove(&self, image: &StoredImage) -> Result<()> {
        let Some(file) = self.resolve(&image.path) else {
            debug!("Image path {} is not a local upload, skipping", image.path);
            return Ok(());
        };

        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                info!("Removed image {:?}", file);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
