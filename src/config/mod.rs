/// Database configuration and connection management
pub mod database;

/// Floor plan, menu and staff seed configuration from config.toml
pub mod floor;
