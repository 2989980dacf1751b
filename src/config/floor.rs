//! Floor configuration loading from config.toml
//!
//! The seed file describes the physical floor (tables and decorative zones),
//! the menu, and the staff accounts known at start-up. It is applied by
//! [`crate::core::seed::seed_floor`] on every launch; entries already present
//! are left untouched.

use crate::entities::{MenuItemType, Role, ZoneType};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct FloorConfig {
    /// Tables to place on the floor
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    /// Decorative regions of the floor plan
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
    /// Menu items offered
    #[serde(default)]
    pub menu_items: Vec<MenuItemConfig>,
    /// Users to register
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// A single table
#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    /// Unique table number
    pub number: i32,
    /// Seating capacity
    pub chairs: i32,
    /// Floor-plan offset from the top
    pub top: f64,
    /// Floor-plan offset from the left
    pub left: f64,
}

/// A single decorative zone
#[derive(Debug, Deserialize, Clone)]
pub struct ZoneConfig {
    /// Region kind
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    /// Floor-plan offset from the top
    #[serde(default)]
    pub top: f64,
    /// Floor-plan offset from the left
    #[serde(default)]
    pub left: f64,
    /// Region width
    #[serde(default = "default_zone_width")]
    pub width: f64,
    /// Region height
    #[serde(default = "default_zone_height")]
    pub height: f64,
}

/// A single menu item
#[derive(Debug, Deserialize, Clone)]
pub struct MenuItemConfig {
    /// Display name
    pub name: String,
    /// Food or drink
    pub item_type: MenuItemType,
    /// Unit price
    pub price: i64,
    /// Unique code
    pub code: String,
}

/// A single user
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// Login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Access role
    pub role: Role,
}

const fn default_zone_width() -> f64 {
    200.0
}

const fn default_zone_height() -> f64 {
    100.0
}

/// Loads floor configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or an enum value is unknown
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FloorConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load floor configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads floor configuration from `FLOOR_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<FloorConfig> {
    let path = std::env::var("FLOOR_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
