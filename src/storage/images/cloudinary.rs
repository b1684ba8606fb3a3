//! Images uploaded to Cloudinary through its signed REST API.
//!
//! Requests are signed by hashing the sorted parameters followed by the API
//! secret with SHA-256.

use super::{ImageStore, ImageUpload, StoredImage};
use crate::{
    config::server::CloudinaryConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

const API_BASE: &str = "https://api.cloudinary.com";

/// Stores images in a Cloudinary account
#[derive(Debug, Clone)]
pub struct CloudinaryImageStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStore {
    /// Creates a store for the configured account.
    #[must_use]
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{API_BASE}/v1_1/{}/image/{action}", self.config.cloud_name)
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        signature(params, &self.config.api_secret)
    }
}

/// Cloudinary request signature over `params` (without `api_key` or `file`).
fn signature(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by_key(|(k, _)| *k);
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

async fn error_for_status(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::ImageStorage {
        message: format!("Cloudinary {action} failed with {status}: {body}"),
    })
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let folder = self.config.folder.clone().unwrap_or_default();
        let signature = self.sign(&[
            ("folder", folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let mut file = Part::bytes(upload.bytes)
            .file_name(upload.file_name.unwrap_or_else(|| "image".to_string()));
        if let Some(content_type) = &upload.content_type {
            file = file.mime_str(content_type)?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        if !folder.is_empty() {
            form = form.text("folder", folder);
        }

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = error_for_status(response, "upload").await?.json().await?;
        info!("Uploaded image to Cloudinary as {}", uploaded.public_id);

        Ok(StoredImage {
            path: uploaded.secure_url,
            public_id: Some(uploaded.public_id),
        })
    }

    async fn remove(&self, image: &StoredImage) -> Result<()> {
        let Some(public_id) = image.public_id.as_deref() else {
            debug!("Image {} has no Cloudinary public id, skipping", image.path);
            return Ok(());
        };

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ]);
        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;
        let destroyed: DestroyResponse = error_for_status(response, "destroy").await?.json().await?;

        match destroyed.result.as_str() {
            "ok" => {
                info!("Removed Cloudinary image {}", public_id);
                Ok(())
            }
            "not found" => {
                warn!("Cloudinary image {} was already gone", public_id);
                Ok(())
            }
            other => Err(Error::ImageStorage {
                message: format!("Cloudinary destroy returned {other} for {public_id}"),
            }),
        }
    }
}
