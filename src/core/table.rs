//! Table business logic - Floor layout and direct staff actions on tables.
//!
//! Besides plain layout maintenance, this module owns the only writers of
//! `dining_tables.status`: [`seat_table`], [`free_table`], and
//! [`set_table_status`], which reservation and order operations call inside
//! their own transaction to propagate derived state.

use crate::{
    core::{
        access::{Actor, Operation, authorize},
        lifecycle::{self, TableAction},
    },
    entities::{DiningTable, Order, TableStatus, dining_table, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Layout fields of a table. Status is derived and never set here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Unique table number
    pub number: i32,
    /// Seating capacity, at least 1
    pub chairs: i32,
    /// Floor-plan offset from the top
    pub top: f64,
    /// Floor-plan offset from the left
    pub left: f64,
}

impl TableLayout {
    fn validate(&self) -> Result<()> {
        if self.chairs < 1 {
            return Err(Error::validation("A table needs at least one chair."));
        }
        if !self.top.is_finite() || !self.left.is_finite() {
            return Err(Error::validation("Table position must be a finite number."));
        }
        Ok(())
    }
}

/// Loads a table by id inside any connection or transaction.
pub(crate) async fn find_table<C>(conn: &C, table_id: i64) -> Result<dining_table::Model>
where
    C: ConnectionTrait,
{
    DiningTable::find_by_id(table_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Table",
            id: table_id,
        })
}

/// Writes a derived status onto a table.
///
/// Called by the lifecycle operations inside the transaction of the
/// triggering write, so the table never lags behind its reservation or order.
pub(crate) async fn set_table_status<C>(
    conn: &C,
    table_id: i64,
    status: TableStatus,
) -> Result<dining_table::Model>
where
    C: ConnectionTrait,
{
    let table = find_table(conn, table_id).await?;
    if table.status == status {
        return Ok(table);
    }

    let previous = table.status;
    let mut table: dining_table::ActiveModel = table.into();
    table.status = Set(status);
    let updated = table.update(conn).await?;
    debug!(
        table_id,
        from = ?previous,
        to = ?status,
        "table status propagated"
    );
    Ok(updated)
}

/// Whether the table currently has an unpaid order.
pub(crate) async fn has_unpaid_order<C>(conn: &C, table_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Order::find()
        .filter(order::Column::TableId.eq(table_id))
        .filter(order::Column::IsPaid.eq(false))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Lists every table, ordered by number.
pub async fn list_tables(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<dining_table::Model>> {
    authorize(actor, Operation::ReadFloor)?;
    DiningTable::find()
        .order_by_asc(dining_table::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a single table.
///
/// # Errors
/// Returns `Error::NotFound` if the table does not exist.
pub async fn get_table(
    db: &DatabaseConnection,
    actor: &Actor,
    table_id: i64,
) -> Result<dining_table::Model> {
    authorize(actor, Operation::ReadFloor)?;
    find_table(db, table_id).await
}

/// Places a new table on the floor. New tables always start `available`.
///
/// # Errors
/// Returns an error if:
/// - The actor is not a manager
/// - The layout is invalid (no chairs, non-finite position)
/// - Another table already uses the number
pub async fn create_table(
    db: &DatabaseConnection,
    actor: &Actor,
    layout: TableLayout,
) -> Result<dining_table::Model> {
    authorize(actor, Operation::WriteFloor)?;
    layout.validate()?;

    let number = layout.number;
    let table = dining_table::ActiveModel {
        number: Set(layout.number),
        chairs: Set(layout.chairs),
        status: Set(TableStatus::Available),
        top: Set(layout.top),
        left: Set(layout.left),
        ..Default::default()
    };
    let created = table.insert(db).await.map_err(|e| {
        Error::from(e).conflict_as_validation(&format!("Table number {number} already exists."))
    })?;
    info!(table_id = created.id, number, "table created");
    Ok(created)
}

/// Replaces the layout of an existing table. Status is left untouched.
///
/// # Errors
/// Returns an error if the actor is not a manager, the layout is invalid, the
/// table does not exist, or the new number is taken.
pub async fn update_table(
    db: &DatabaseConnection,
    actor: &Actor,
    table_id: i64,
    layout: TableLayout,
) -> Result<dining_table::Model> {
    authorize(actor, Operation::WriteFloor)?;
    layout.validate()?;

    let number = layout.number;
    let mut table: dining_table::ActiveModel = find_table(db, table_id).await?.into();
    table.number = Set(layout.number);
    table.chairs = Set(layout.chairs);
    table.top = Set(layout.top);
    table.left = Set(layout.left);

    table.update(db).await.map_err(|e| {
        Error::from(e).conflict_as_validation(&format!("Table number {number} already exists."))
    })
}

/// Removes a table together with its reservations and orders.
///
/// # Errors
/// Returns `Error::NotFound` if the table does not exist.
pub async fn delete_table(db: &DatabaseConnection, actor: &Actor, table_id: i64) -> Result<()> {
    authorize(actor, Operation::WriteFloor)?;
    let result = DiningTable::delete_by_id(table_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Table",
            id: table_id,
        });
    }
    info!(table_id, "table deleted");
    Ok(())
}

/// Seats guests: the table becomes `occupied` regardless of reservations or
/// orders. This is the manual override staff use at the door.
///
/// # Errors
/// Returns an error if the actor is not staff or the table does not exist.
#[instrument(skip(db))]
pub async fn seat_table(
    db: &DatabaseConnection,
    actor: &Actor,
    table_id: i64,
) -> Result<dining_table::Model> {
    authorize(actor, Operation::SeatTable)?;

    let txn = db.begin().await?;
    let status = lifecycle::table_status_for_action(TableAction::Seat, false)?;
    let table = set_table_status(&txn, table_id, status).await?;
    txn.commit().await?;

    info!(table_id, "guests seated, table is now occupied");
    Ok(table)
}

/// Frees a table: it becomes `available` unless an unpaid order is open.
///
/// # Errors
/// Returns an error if:
/// - The actor is not staff
/// - The table does not exist
/// - The table has an unpaid order (`Error::Validation`); status is unchanged
#[instrument(skip(db))]
pub async fn free_table(
    db: &DatabaseConnection,
    actor: &Actor,
    table_id: i64,
) -> Result<dining_table::Model> {
    authorize(actor, Operation::FreeTable)?;

    let txn = db.begin().await?;
    let has_unpaid = has_unpaid_order(&txn, table_id).await?;
    let status = lifecycle::table_status_for_action(TableAction::Free, has_unpaid)?;
    let table = set_table_status(&txn, table_id, status).await?;
    txn.commit().await?;

    info!(table_id, "table is now available");
    Ok(table)
}
