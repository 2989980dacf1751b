//! Access policy - the single role gate in front of every floor operation.
//!
//! Operations call [`authorize`] once, before touching the store. The rules
//! live in [`allowed_roles`]; no other module compares roles for permission
//! purposes. Row-level scoping (clients seeing only their own reservations) is
//! applied by the reservation queries after the gate has passed.

use crate::{
    entities::Role,
    errors::{Error, Result},
};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated caller, as handed over by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable user identifier
    pub user_id: i64,
    /// Role the caller acts in
    pub role: Role,
}

impl Actor {
    /// Creates an actor for the given user and role.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether this actor is floor staff (waiter or manager).
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self.role, Role::Waiter | Role::Manager)
    }
}

/// Every gated operation of the floor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Operation {
    CreateReservation,
    /// Approve or reject
    DecideReservation,
    /// List or view reservations; clients are scoped to their own
    ViewReservations,
    ViewTableStatus,
    SeatTable,
    FreeTable,
    CreateOrder,
    ViewOrders,
    /// Add, re-quantify or remove order lines
    ModifyOrder,
    PayOrder,
    /// Plain reads of tables and zones
    ReadFloor,
    /// Create, update or delete tables and zones
    WriteFloor,
    ReadMenu,
    WriteMenu,
    /// The "me" lookup
    ViewProfile,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CreateReservation => "create a reservation",
            Self::DecideReservation => "approve or reject a reservation",
            Self::ViewReservations => "view reservations",
            Self::ViewTableStatus => "view the table status overview",
            Self::SeatTable => "seat a table",
            Self::FreeTable => "free a table",
            Self::CreateOrder => "create an order",
            Self::ViewOrders => "view orders",
            Self::ModifyOrder => "modify an order",
            Self::PayOrder => "pay an order",
            Self::ReadFloor => "read tables and zones",
            Self::WriteFloor => "change tables and zones",
            Self::ReadMenu => "read the menu",
            Self::WriteMenu => "change the menu",
            Self::ViewProfile => "view the current profile",
        };
        f.write_str(text)
    }
}

const EVERYONE: &[Role] = &[Role::Client, Role::Waiter, Role::Manager];
const STAFF: &[Role] = &[Role::Waiter, Role::Manager];
const MANAGER: &[Role] = &[Role::Manager];
const CLIENT: &[Role] = &[Role::Client];

/// Roles allowed to perform `operation`.
#[must_use]
pub const fn allowed_roles(operation: Operation) -> &'static [Role] {
    match operation {
        Operation::CreateReservation => CLIENT,
        Operation::DecideReservation | Operation::WriteFloor | Operation::WriteMenu => MANAGER,
        Operation::ViewTableStatus
        | Operation::SeatTable
        | Operation::FreeTable
        | Operation::CreateOrder
        | Operation::ViewOrders
        | Operation::ModifyOrder
        | Operation::PayOrder => STAFF,
        Operation::ViewReservations
        | Operation::ReadFloor
        | Operation::ReadMenu
        | Operation::ViewProfile => EVERYONE,
    }
}

/// Turns the identity provider's optional actor into an authenticated one.
///
/// # Errors
/// Returns `Error::AuthenticationRequired` when no actor is present.
pub fn authenticate(actor: Option<Actor>) -> Result<Actor> {
    actor.ok_or(Error::AuthenticationRequired)
}

/// Checks that `actor` may perform `operation`.
///
/// # Errors
/// Returns `Error::AuthorizationDenied` when the actor's role is not listed
/// for the operation.
pub fn authorize(actor: &Actor, operation: Operation) -> Result<()> {
    if allowed_roles(operation).contains(&actor.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = actor.user_id, ?operation, "access denied");
        Err(Error::AuthorizationDenied {
            role: actor.role.to_value(),
            operation: operation.to_string(),
        })
    }
}
