//! Reservation entity - A client's request to hold a table at a given time.
//!
//! Reservations are created `pending` and decided by a manager. At most one
//! `approved` reservation exists per (table, datetime), enforced by the
//! `uniq_table_datetime_when_approved` partial index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval state of a reservation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting a manager decision.
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Holds the table for its datetime.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined by a manager.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Reservation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Unique identifier for the reservation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the client who made the reservation
    pub user_id: i64,
    /// ID of the reserved table
    pub table_id: i64,
    /// Time slot being reserved
    pub datetime: DateTimeUtc,
    /// Free-text note from the client
    pub description: String,
    /// Approval state
    pub status: ReservationStatus,
}

/// Defines relationships between Reservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reservation belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each reservation targets one table
    #[sea_orm(
        belongs_to = "super::dining_table::Entity",
        from = "Column::TableId",
        to = "super::dining_table::Column::Id",
        on_delete = "Cascade"
    )]
    DiningTable,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::dining_table::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
