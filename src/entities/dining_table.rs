//! Dining table entity - A physical seating unit on the floor plan.
//!
//! Each table has a unique number, a seating capacity, a position used for
//! floor-plan rendering, and a lifecycle status. The status is derived from
//! reservation and order events; it is only written through the lifecycle
//! operations in `crate::core`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Occupancy state of a dining table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// Free to be seated, ordered at, or reserved.
    #[sea_orm(string_value = "available")]
    #[default]
    Available,
    /// Holds an approved reservation.
    #[sea_orm(string_value = "reserved")]
    Reserved,
    /// Guests are seated or an unpaid order is open.
    #[sea_orm(string_value = "occupied")]
    Occupied,
}

/// Dining table database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dining_tables")]
pub struct Model {
    /// Unique identifier for the table
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Number shown to staff and guests, unique across the floor
    #[sea_orm(unique)]
    pub number: i32,
    /// Seating capacity
    pub chairs: i32,
    /// Current occupancy status
    pub status: TableStatus,
    /// Distance from the top edge of the floor plan
    pub top: f64,
    /// Distance from the left edge of the floor plan
    pub left: f64,
}

/// Defines relationships between `DiningTable` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One table has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
    /// One table has many orders (at most one unpaid)
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
