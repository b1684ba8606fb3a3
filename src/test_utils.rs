//! Shared test utilities for `PharmaList`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{category, valid_name},
    entities,
    errors::{Error, Result},
    storage::{ImageStore, ImageUpload, MemoryRawStore, RawMedicine, RawMedicineStore, StoredImage},
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test category with the default color.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name.to_string(), None).await
}

/// Creates a test valid name with a single "B" unit.
pub async fn create_test_valid_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<valid_name::ValidNameView> {
    valid_name::create_valid_name(db, name.to_string(), vec!["B".to_string()]).await
}

/// Wraps `records` in an in-memory raw store.
#[must_use]
pub fn raw_store(records: Vec<RawMedicine>) -> RawMedicineStore {
    RawMedicineStore::new(MemoryRawStore::new(records))
}

/// A small PNG-typed upload.
#[must_use]
pub fn test_image(file_name: &str) -> ImageUpload {
    ImageUpload {
        file_name: Some(file_name.to_string()),
        content_type: Some("image/png".to_string()),
        bytes: b"\x89PNG test image".to_vec(),
    }
}

/// Image store that accepts uploads but can never remove them.
pub struct FailingRemovalImageStore;

#[async_trait]
impl ImageStore for FailingRemovalImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage> {
        Ok(StoredImage {
            path: format!("memory://{}", upload.file_name.unwrap_or_default()),
            public_id: Some("test".to_string()),
        })
    }

    async fn remove(&self, _image: &StoredImage) -> Result<()> {
        Err(Error::ImageStorage {
            message: "removal disabled".to_string(),
        })
    }
}
