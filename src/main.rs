use dotenvy::dotenv;
use pharmalist::{
    api::{self, AppState, RouterConfig},
    config::{
        self,
        server::{ImageBackend, ServerConfig},
    },
    core::category,
    errors::Result,
    storage::{
        CloudinaryImageStore, ImageStore, JsonFileRawStore, LocalImageStore, RawMedicineStore,
    },
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Seed data for categories, read from the working directory when present
const SEED_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    // 2. Load .env file (non-fatal, env vars can be set externally)
    if dotenv().is_ok() {
        info!("Loaded .env file.");
    }

    // 3. Load server settings
    let server_config = ServerConfig::from_env()
        .inspect_err(|e| error!("Invalid server configuration: {}", e))?;

    // 4. Connect to the database and create tables
    let database_url = config::database::get_database_url();
    let db = config::database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Connected to database."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed categories from config.toml, if present
    let seeds = config::categories::load_optional_config(SEED_CONFIG_PATH)?;
    let seeded = category::seed_categories(&db, &seeds.categories)
        .await
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;
    if seeded > 0 {
        info!("Seeded {} categories.", seeded);
    }

    // 6. Open the raw medicine list and the image backend
    let raw_medicines =
        RawMedicineStore::new(JsonFileRawStore::new(server_config.raw_medicines_path.clone()));
    info!(
        "Raw medicines file: {}",
        server_config.raw_medicines_path.display()
    );

    let images: Arc<dyn ImageStore> = match &server_config.image_backend {
        ImageBackend::Local => {
            info!(
                "Storing images under {}",
                server_config.upload_dir.display()
            );
            Arc::new(LocalImageStore::new(server_config.upload_dir.clone()))
        }
        ImageBackend::Cloudinary(cloudinary) => {
            info!("Storing images in Cloudinary cloud {}", cloudinary.cloud_name);
            Arc::new(CloudinaryImageStore::new(cloudinary.clone()))
        }
    };

    // 7. Serve the API
    let state = AppState::new(db, raw_medicines, images);
    let app = api::build_router(state, &RouterConfig::from(&server_config));

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    info!("Listening on http://{}", server_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
