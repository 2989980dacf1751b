//! Reservation business logic - Booking requests and manager decisions.
//!
//! Approval is the one operation that races: two managers approving different
//! reservations for the same (table, datetime) slot. The pre-check and the
//! status write share one transaction, and the
//! `uniq_table_datetime_when_approved` partial index rejects whichever write
//! loses if the check is ever bypassed.

use crate::{
    core::{
        access::{Actor, Operation, authorize},
        lifecycle::{self, ReservationDecision},
        table::{find_table, set_table_status},
    },
    entities::{Reservation, ReservationStatus, reservation},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const DATE_BOOKED: &str = "The date is already booked.";
const SLOT_TAKEN: &str = "There is already an approved reservation for that table and time.";

/// What a client submits when booking a table.
///
/// Status and owner are not part of the request: every reservation starts
/// `pending` and belongs to the calling client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    /// Table to hold
    pub table_id: i64,
    /// Requested time slot
    pub datetime: DateTime<Utc>,
    /// Free-text note
    #[serde(default)]
    pub description: String,
}

/// Whether another reservation already holds `approved` for the slot.
async fn slot_is_approved<C>(
    conn: &C,
    table_id: i64,
    datetime: DateTime<Utc>,
    excluding: Option<i64>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut query = Reservation::find()
        .filter(reservation::Column::TableId.eq(table_id))
        .filter(reservation::Column::Datetime.eq(datetime))
        .filter(reservation::Column::Status.eq(ReservationStatus::Approved));
    if let Some(id) = excluding {
        query = query.filter(reservation::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

async fn find_reservation<C>(conn: &C, reservation_id: i64) -> Result<reservation::Model>
where
    C: ConnectionTrait,
{
    Reservation::find_by_id(reservation_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Reservation",
            id: reservation_id,
        })
}

/// Books a table for the calling client. The reservation starts `pending`.
///
/// # Errors
/// Returns an error if:
/// - The actor is not a client
/// - The table does not exist (`Error::Validation`)
/// - An approved reservation already holds the exact (table, datetime)
#[instrument(skip(db, request), fields(table_id = request.table_id))]
pub async fn create_reservation(
    db: &DatabaseConnection,
    actor: &Actor,
    request: NewReservation,
) -> Result<reservation::Model> {
    authorize(actor, Operation::CreateReservation)?;

    let txn = db.begin().await?;
    find_table(&txn, request.table_id)
        .await
        .map_err(|e| match e {
            Error::NotFound { .. } => Error::validation("Table does not exist."),
            other => other,
        })?;
    if slot_is_approved(&txn, request.table_id, request.datetime, None).await? {
        return Err(Error::validation(DATE_BOOKED));
    }

    let created = reservation::ActiveModel {
        user_id: Set(actor.user_id),
        table_id: Set(request.table_id),
        datetime: Set(request.datetime),
        description: Set(request.description),
        status: Set(ReservationStatus::Pending),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        reservation_id = created.id,
        user_id = actor.user_id,
        "reservation requested"
    );
    Ok(created)
}

/// Lists reservations ordered by datetime, optionally filtered by status.
///
/// Clients only ever see their own; staff see all.
pub async fn list_reservations(
    db: &DatabaseConnection,
    actor: &Actor,
    status: Option<ReservationStatus>,
) -> Result<Vec<reservation::Model>> {
    authorize(actor, Operation::ViewReservations)?;

    let mut query = Reservation::find();
    if !actor.is_staff() {
        query = query.filter(reservation::Column::UserId.eq(actor.user_id));
    }
    if let Some(status) = status {
        query = query.filter(reservation::Column::Status.eq(status));
    }
    query
        .order_by_asc(reservation::Column::Datetime)
        .order_by_asc(reservation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one reservation.
///
/// # Errors
/// Returns `Error::NotFound` if the reservation does not exist, or if a client
/// asks for someone else's.
pub async fn get_reservation(
    db: &DatabaseConnection,
    actor: &Actor,
    reservation_id: i64,
) -> Result<reservation::Model> {
    authorize(actor, Operation::ViewReservations)?;
    let found = find_reservation(db, reservation_id).await?;
    if !actor.is_staff() && found.user_id != actor.user_id {
        return Err(Error::NotFound {
            entity: "Reservation",
            id: reservation_id,
        });
    }
    Ok(found)
}

/// Approves a reservation and marks its table `reserved`.
///
/// # Errors
/// Returns an error if:
/// - The actor is not a manager
/// - The reservation does not exist
/// - The reservation is already approved
/// - Another reservation is already approved for the same table and datetime;
///   the table is left untouched
pub async fn approve_reservation(
    db: &DatabaseConnection,
    actor: &Actor,
    reservation_id: i64,
) -> Result<reservation::Model> {
    decide(db, actor, reservation_id, ReservationDecision::Approve).await
}

/// Rejects a reservation and marks its table `available`.
///
/// The table is freed even if an order was opened on it in the meantime.
///
/// # Errors
/// Returns an error if the actor is not a manager or the reservation does not
/// exist.
pub async fn reject_reservation(
    db: &DatabaseConnection,
    actor: &Actor,
    reservation_id: i64,
) -> Result<reservation::Model> {
    decide(db, actor, reservation_id, ReservationDecision::Reject).await
}

#[instrument(skip(db))]
async fn decide(
    db: &DatabaseConnection,
    actor: &Actor,
    reservation_id: i64,
    decision: ReservationDecision,
) -> Result<reservation::Model> {
    authorize(actor, Operation::DecideReservation)?;

    let txn = db.begin().await?;
    let current = find_reservation(&txn, reservation_id).await?;
    let next = lifecycle::decide_reservation(current.status, decision)?;

    if next == ReservationStatus::Approved
        && slot_is_approved(&txn, current.table_id, current.datetime, Some(current.id)).await?
    {
        return Err(Error::validation(SLOT_TAKEN));
    }

    let table_id = current.table_id;
    let mut active: reservation::ActiveModel = current.into();
    active.status = Set(next);
    let updated = active
        .update(&txn)
        .await
        .map_err(|e| Error::from(e).conflict_as_validation(SLOT_TAKEN))?;

    if let Some(table_status) = lifecycle::table_status_for_reservation(next) {
        set_table_status(&txn, table_id, table_status).await?;
    }
    txn.commit().await?;

    info!(reservation_id, table_id, status = ?next, "reservation decided");
    Ok(updated)
}
