//! HTTP server and storage settings read from the environment.
//!
//! All values have defaults so the server starts with zero configuration. The
//! Cloudinary backend is selected only when all three credentials are present.

use crate::errors::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RAW_MEDICINES_FILE: &str = "raw-medicines.json";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Cloudinary account credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    /// Account cloud name
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used for request signatures
    pub api_secret: String,
    /// Folder uploads are placed in
    pub folder: Option<String>,
}

/// Where uploaded images are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageBackend {
    /// Files under the upload directory, served at `/uploads`
    Local,
    /// Remote Cloudinary account
    Cloudinary(CloudinaryConfig),
}

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: SocketAddr,
    /// JSON file holding the raw medicine list
    pub raw_medicines_path: PathBuf,
    /// Directory for locally stored images
    pub upload_dir: PathBuf,
    /// Largest accepted upload request body
    pub max_upload_bytes: usize,
    /// Image storage backend
    pub image_backend: ImageBackend,
}

impl ServerConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(port) => port.trim().parse::<u16>().map_err(|e| Error::Config {
                message: format!("Invalid PORT {port:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config {
                message: format!("Invalid bind address {host}:{port}: {e}"),
            })?;

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(bytes) => bytes.trim().parse::<usize>().map_err(|e| Error::Config {
                message: format!("Invalid MAX_UPLOAD_BYTES {bytes:?}: {e}"),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let image_backend = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                ImageBackend::Cloudinary(CloudinaryConfig {
                    cloud_name,
                    api_key,
                    api_secret,
                    folder: get("CLOUDINARY_FOLDER"),
                })
            }
            _ => ImageBackend::Local,
        };

        Ok(Self {
            bind_addr,
            raw_medicines_path: get("RAW_MEDICINES_FILE")
                .unwrap_or_else(|| DEFAULT_RAW_MEDICINES_FILE.to_string())
                .into(),
            upload_dir: get("UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            max_upload_bytes,
            image_backend,
        })
    }
}
