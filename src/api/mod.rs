//! HTTP API - axum router, shared state, and handlers.
//!
//! Routes mirror the JSON API the React client calls. Locally stored images are
//! served under `/uploads`.

/// Error mapping and rejection-aware extractors
pub mod error;
/// Request handlers grouped by resource
pub mod handlers;

use crate::{
    config::server::{ImageBackend, ServerConfig},
    storage::{ImageStore, RawMedicineStore},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, put},
};
use handlers::{categories, health, raw_medicines, valid_names};
use sea_orm::DatabaseConnection;
use std::{path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database holding valid names and categories
    pub db: Arc<DatabaseConnection>,
    /// Raw medicine list
    pub raw_medicines: Arc<RawMedicineStore>,
    /// Image backend
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        raw_medicines: RawMedicineStore,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            db: Arc::new(db),
            raw_medicines: Arc::new(raw_medicines),
            images,
        }
    }
}

/// Router settings that do not belong in the per-request state
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Largest accepted upload request body
    pub max_upload_bytes: usize,
    /// Directory served under `/uploads`, when images are stored locally
    pub uploads_dir: Option<PathBuf>,
}

impl From<&ServerConfig> for RouterConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            uploads_dir: matches!(config.image_backend, ImageBackend::Local)
                .then(|| config.upload_dir.clone()),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState, config: &RouterConfig) -> Router {
    let upload = put(valid_names::upload_image)
        .post(valid_names::upload_image)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let api = Router::new()
        .route(
            "/api/raw-medicines",
            get(raw_medicines::list_raw_medicines).put(raw_medicines::replace_raw_medicines),
        )
        .route(
            "/api/raw-medicines/pending",
            get(raw_medicines::list_pending_groups),
        )
        .route(
            "/api/raw-medicines/validate",
            put(raw_medicines::validate_raw_medicine),
        )
        .route(
            "/api/valid-names",
            get(valid_names::list_valid_names).post(valid_names::create_valid_name),
        )
        .route(
            "/api/valid-names/:id",
            get(valid_names::get_valid_name)
                .put(valid_names::update_valid_name)
                .delete(valid_names::delete_valid_name),
        )
        .route("/api/valid-names/:id/upload", upload)
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/api/categories/:id", delete(categories::delete_category))
        .merge(health::health_routes());

    let mut router = api.with_state(state);
    if let Some(dir) = &config.uploads_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
