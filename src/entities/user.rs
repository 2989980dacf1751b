//! User entity - Staff members and clients known to the system.
//!
//! Credentials live with the identity provider; this table only keeps what the
//! floor needs: who made a reservation and which role they act in.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role a user acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Guest making reservations
    #[sea_orm(string_value = "client")]
    Client,
    /// Floor staff handling tables and orders
    #[sea_orm(string_value = "waiter")]
    Waiter,
    /// Staff who decides reservations and maintains the menu and floor
    #[sea_orm(string_value = "manager")]
    Manager,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Contact address
    #[sea_orm(unique)]
    pub email: String,
    /// Role used by the access policy
    pub role: Role,
    /// When the user was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user makes many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
