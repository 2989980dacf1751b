//! Menu item entity - Priced food and drink reference data.
//!
//! Menu items are looked up by order lines to compute totals. Each item has a
//! unique code used by staff when keying orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum MenuItemType {
    /// Kitchen item
    #[sea_orm(string_value = "food")]
    Food,
    /// Bar item
    #[sea_orm(string_value = "drink")]
    Drink,
}

/// Menu item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Unique identifier for the menu item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Pastrmajlija", "Espresso")
    pub name: String,
    /// Food or drink
    pub item_type: MenuItemType,
    /// Unit price in the smallest currency unit
    pub price: i64,
    /// Unique short code
    #[sea_orm(unique)]
    pub code: String,
}

/// Defines relationships between `MenuItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One menu item appears on many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
