//! Lifecycle rules - pure transition logic for reservations, orders and tables.
//!
//! Nothing in this module touches the store. The store-backed operations in
//! [`crate::core::reservation`], [`crate::core::order`] and [`crate::core::table`]
//! ask these functions which transitions are legal and which table status a
//! reservation or order event implies, then apply the answer in the same
//! transaction as the triggering write.
//!
//! Table state machine:
//!
//! ```text
//! available --approve--> reserved --reject--> available
//! available/reserved --order created | seat--> occupied
//! occupied --paid | free | reject--> available
//! ```

use crate::{
    entities::{ReservationStatus, TableStatus, order},
    errors::{Error, Result},
};

/// Manager decision on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationDecision {
    /// Hold the table for the reservation's datetime
    Approve,
    /// Decline the reservation
    Reject,
}

/// Direct staff action on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    /// Mark guests as seated
    Seat,
    /// Release the table
    Free,
}

/// Returns the status a reservation moves to under `decision`.
///
/// Approval is accepted from `pending` or `rejected`; rejection applies from
/// any state.
///
/// # Errors
/// Returns `Error::Validation` when approving an already approved reservation.
pub fn decide_reservation(
    current: ReservationStatus,
    decision: ReservationDecision,
) -> Result<ReservationStatus> {
    match (decision, current) {
        (ReservationDecision::Approve, ReservationStatus::Approved) => {
            Err(Error::validation("Reservation is already approved."))
        }
        (ReservationDecision::Approve, _) => Ok(ReservationStatus::Approved),
        (ReservationDecision::Reject, _) => Ok(ReservationStatus::Rejected),
    }
}

/// Table status implied by a reservation reaching `status`.
///
/// `pending` carries no table consequence. `rejected` frees the table without
/// looking at orders opened in the meantime.
#[must_use]
pub const fn table_status_for_reservation(status: ReservationStatus) -> Option<TableStatus> {
    match status {
        ReservationStatus::Pending => None,
        ReservationStatus::Approved => Some(TableStatus::Reserved),
        ReservationStatus::Rejected => Some(TableStatus::Available),
    }
}

/// Table status implied by saving an order in the given payment state.
#[must_use]
pub const fn table_status_for_order(is_paid: bool) -> TableStatus {
    if is_paid {
        TableStatus::Available
    } else {
        TableStatus::Occupied
    }
}

/// Table status after a direct staff action.
///
/// Seating never checks reservations. Freeing is refused while an unpaid order
/// is open on the table.
///
/// # Errors
/// Returns `Error::Validation` when freeing a table with an unpaid order.
pub fn table_status_for_action(action: TableAction, has_unpaid_order: bool) -> Result<TableStatus> {
    match action {
        TableAction::Seat => Ok(TableStatus::Occupied),
        TableAction::Free if has_unpaid_order => {
            Err(Error::validation("Table has an active unpaid order."))
        }
        TableAction::Free => Ok(TableStatus::Available),
    }
}

/// Orders may only be opened on tables that are not held by a reservation.
///
/// # Errors
/// Returns `Error::Validation` when the table is `reserved`.
pub fn ensure_table_accepts_order(status: TableStatus) -> Result<()> {
    if status == TableStatus::Reserved {
        return Err(Error::validation(
            "Table is reserved. Seat the guests first.",
        ));
    }
    Ok(())
}

/// Paid orders are immutable.
///
/// # Errors
/// Returns `Error::Validation` when the order is already paid.
pub fn ensure_order_open(order: &order::Model) -> Result<()> {
    if order.is_paid {
        return Err(Error::validation("The order has already been paid for."));
    }
    Ok(())
}

/// Line quantities are at least 1.
///
/// # Errors
/// Returns `Error::Validation` for a quantity below 1.
pub fn ensure_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::validation("The quantity must be at least 1."));
    }
    Ok(())
}

/// Folds repeated menu items of an order request into one line each,
/// keeping first-seen order.
///
/// # Errors
/// Returns `Error::Validation` if any quantity is below 1, or if summing
/// overflows.
pub fn merge_order_lines(lines: &[(i64, i32)]) -> Result<Vec<(i64, i32)>> {
    let mut merged: Vec<(i64, i32)> = Vec::with_capacity(lines.len());
    for &(menu_item_id, quantity) in lines {
        ensure_quantity(quantity)?;
        if let Some(existing) = merged.iter_mut().find(|(id, _)| *id == menu_item_id) {
            existing.1 = existing
                .1
                .checked_add(quantity)
                .ok_or_else(|| Error::validation("The quantity is too large."))?;
        } else {
            merged.push((menu_item_id, quantity));
        }
    }
    Ok(merged)
}
