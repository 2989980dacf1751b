//! Zone entity - Decorative floor-plan regions (glass, terrace, green area).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of floor-plan region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// Glassed-in section
    #[sea_orm(string_value = "glass")]
    Glass,
    /// Outdoor terrace
    #[sea_orm(string_value = "terrace")]
    Terrace,
    /// Green area
    #[sea_orm(string_value = "green")]
    Green,
}

/// Zone database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "zones")]
pub struct Model {
    /// Unique identifier for the zone
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Region kind
    pub zone_type: ZoneType,
    /// Distance from the top edge of the floor plan
    pub top: f64,
    /// Distance from the left edge of the floor plan
    pub left: f64,
    /// Region width
    pub width: f64,
    /// Region height
    pub height: f64,
}

/// Zones are pure presentation data and have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
