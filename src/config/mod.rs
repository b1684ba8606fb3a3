/// Seed categories loaded from config.toml
pub mod categories;

/// Database configuration and connection management
pub mod database;

/// HTTP server and storage settings from environment variables
pub mod server;
