//! Order business logic - Opening, editing and paying a table's order.
//!
//! Every mutation runs in one database transaction: the guard checks, the
//! write, and the propagation of the order's state onto its table either all
//! land or none do. The application-level "already has an unpaid order" check
//! only exists to produce a friendly message; the `uniq_active_order_per_table`
//! index is what actually prevents two unpaid orders on one table, and its
//! violation is reported with the same message.
//!
//! Line mutations return a view re-read from the store, never the instance
//! that was just written.

use crate::{
    core::{
        access::{Actor, Operation, authorize},
        lifecycle,
        projection::{self, OrderView},
        table::{find_table, has_unpaid_order, set_table_status},
    },
    entities::{MenuItem, Order, OrderItem, menu_item, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

const ACTIVE_ORDER_EXISTS: &str = "There is already an active order for this table.";
const UNKNOWN_MENU_ITEM: &str = "Non-existing item.";
const UNKNOWN_LINE: &str = "The item does not exist for this order.";

/// One requested line when opening an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    /// Menu item to serve
    pub menu_item_id: i64,
    /// Units, at least 1
    pub quantity: i32,
}

impl NewOrderLine {
    /// Creates a requested line.
    #[must_use]
    pub const fn new(menu_item_id: i64, quantity: i32) -> Self {
        Self {
            menu_item_id,
            quantity,
        }
    }
}

async fn find_order<C>(conn: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Order",
            id: order_id,
        })
}

/// Loads an order and refuses to continue if it is already paid.
async fn find_open_order<C>(conn: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let order = find_order(conn, order_id).await?;
    lifecycle::ensure_order_open(&order)?;
    Ok(order)
}

async fn ensure_menu_items_exist<C>(conn: &C, menu_item_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    if menu_item_ids.is_empty() {
        return Ok(());
    }
    let found: HashSet<i64> = MenuItem::find()
        .filter(menu_item::Column::Id.is_in(menu_item_ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();
    if menu_item_ids.iter().all(|id| found.contains(id)) {
        Ok(())
    } else {
        Err(Error::validation(UNKNOWN_MENU_ITEM))
    }
}

async fn find_line<C>(conn: &C, order_id: i64, order_item_id: i64) -> Result<order_item::Model>
where
    C: ConnectionTrait,
{
    OrderItem::find_by_id(order_item_id)
        .filter(order_item::Column::OrderId.eq(order_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::validation(UNKNOWN_LINE))
}

/// Opens an order on a table with its initial lines.
///
/// Repeated menu items in `lines` are merged into a single line. On success
/// the table becomes `occupied`.
///
/// # Errors
/// Returns an error if:
/// - The actor is not staff
/// - Any quantity is below 1
/// - The table or a menu item does not exist (`Error::Validation`)
/// - The table is `reserved`; no order row is created
/// - The table already has an unpaid order, whether caught by the pre-check or
///   by the store constraint
#[instrument(skip(db, lines), fields(lines = lines.len()))]
pub async fn create_order(
    db: &DatabaseConnection,
    actor: &Actor,
    table_id: i64,
    lines: &[NewOrderLine],
) -> Result<OrderView> {
    authorize(actor, Operation::CreateOrder)?;
    let requested: Vec<(i64, i32)> = lines
        .iter()
        .map(|line| (line.menu_item_id, line.quantity))
        .collect();
    let merged = lifecycle::merge_order_lines(&requested)?;

    let txn = db.begin().await?;

    let table = find_table(&txn, table_id).await.map_err(|e| match e {
        Error::NotFound { .. } => Error::validation("Table does not exist."),
        other => other,
    })?;
    lifecycle::ensure_table_accepts_order(table.status)?;
    if has_unpaid_order(&txn, table_id).await? {
        return Err(Error::validation(ACTIVE_ORDER_EXISTS));
    }
    let menu_item_ids: Vec<i64> = merged.iter().map(|(id, _)| *id).collect();
    ensure_menu_items_exist(&txn, &menu_item_ids).await?;

    let order = order::ActiveModel {
        table_id: Set(table_id),
        is_paid: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from(e).conflict_as_validation(ACTIVE_ORDER_EXISTS))?;

    if !merged.is_empty() {
        let items = merged
            .iter()
            .map(|&(menu_item_id, quantity)| order_item::ActiveModel {
                order_id: Set(order.id),
                menu_item_id: Set(menu_item_id),
                quantity: Set(quantity),
                ..Default::default()
            });
        OrderItem::insert_many(items).exec(&txn).await?;
    }

    set_table_status(&txn, table_id, lifecycle::table_status_for_order(order.is_paid)).await?;
    let view = projection::load_order_view(&txn, order.id).await?;
    txn.commit().await?;

    info!(
        order_id = view.order.id,
        table_id,
        total = view.total,
        "order opened"
    );
    Ok(view)
}

/// Retrieves one order with its lines and total.
///
/// # Errors
/// Returns `Error::NotFound` if the order does not exist.
pub async fn get_order(db: &DatabaseConnection, actor: &Actor, order_id: i64) -> Result<OrderView> {
    authorize(actor, Operation::ViewOrders)?;
    projection::load_order_view(db, order_id).await
}

/// Lists all orders, newest first, with lines and totals.
pub async fn list_orders(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<OrderView>> {
    authorize(actor, Operation::ViewOrders)?;
    let orders = Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    projection::build_order_views(db, orders).await
}

/// Adds `quantity` units of a menu item to an unpaid order.
///
/// If the menu item is already on the order its line grows; otherwise a new
/// line is inserted.
///
/// # Errors
/// Returns an error if:
/// - The actor is not staff
/// - `quantity` is below 1
/// - The order does not exist or is already paid
/// - The menu item does not exist (`Error::Validation`)
#[instrument(skip(db))]
pub async fn add_item(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
) -> Result<OrderView> {
    authorize(actor, Operation::ModifyOrder)?;
    lifecycle::ensure_quantity(quantity)?;

    let txn = db.begin().await?;
    let order = find_open_order(&txn, order_id).await?;
    ensure_menu_items_exist(&txn, &[menu_item_id]).await?;

    let existing = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .filter(order_item::Column::MenuItemId.eq(menu_item_id))
        .one(&txn)
        .await?;

    if let Some(line) = existing {
        let new_quantity = line
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| Error::validation("The quantity is too large."))?;
        let mut line: order_item::ActiveModel = line.into();
        line.quantity = Set(new_quantity);
        line.update(&txn).await?;
    } else {
        order_item::ActiveModel {
            order_id: Set(order_id),
            menu_item_id: Set(menu_item_id),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            Error::from(e).conflict_as_validation("The item was added concurrently. Try again.")
        })?;
    }

    set_table_status(&txn, order.table_id, lifecycle::table_status_for_order(false)).await?;
    let view = projection::load_order_view(&txn, order_id).await?;
    txn.commit().await?;
    Ok(view)
}

/// Replaces the quantity of one line of an unpaid order.
///
/// # Errors
/// Returns an error if:
/// - The actor is not staff
/// - `quantity` is below 1
/// - The order does not exist or is already paid
/// - The line does not belong to the order (`Error::Validation`)
#[instrument(skip(db))]
pub async fn set_item_qty(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: i64,
    order_item_id: i64,
    quantity: i32,
) -> Result<OrderView> {
    authorize(actor, Operation::ModifyOrder)?;
    lifecycle::ensure_quantity(quantity)?;

    let txn = db.begin().await?;
    let order = find_open_order(&txn, order_id).await?;
    let mut line: order_item::ActiveModel = find_line(&txn, order_id, order_item_id).await?.into();
    line.quantity = Set(quantity);
    line.update(&txn).await?;

    set_table_status(&txn, order.table_id, lifecycle::table_status_for_order(false)).await?;
    let view = projection::load_order_view(&txn, order_id).await?;
    txn.commit().await?;
    Ok(view)
}

/// Deletes one line of an unpaid order.
///
/// # Errors
/// Returns an error if:
/// - The actor is not staff
/// - The order does not exist or is already paid
/// - The line does not belong to the order (`Error::Validation`)
#[instrument(skip(db))]
pub async fn remove_item(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: i64,
    order_item_id: i64,
) -> Result<OrderView> {
    authorize(actor, Operation::ModifyOrder)?;

    let txn = db.begin().await?;
    let order = find_open_order(&txn, order_id).await?;
    let line = find_line(&txn, order_id, order_item_id).await?;
    line.delete(&txn).await?;

    set_table_status(&txn, order.table_id, lifecycle::table_status_for_order(false)).await?;
    let view = projection::load_order_view(&txn, order_id).await?;
    txn.commit().await?;
    Ok(view)
}

/// Records payment of an order. Irreversible; the table becomes `available`.
///
/// The paid flag is flipped with a conditional update on `is_paid = false`,
/// so a second payment can never succeed even if two calls interleave.
///
/// # Errors
/// Returns an error if:
/// - The actor is not staff
/// - The order does not exist
/// - The order is already paid (`Error::Validation`)
#[instrument(skip(db))]
pub async fn pay_order(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: i64,
) -> Result<order::Model> {
    authorize(actor, Operation::PayOrder)?;

    let txn = db.begin().await?;
    let order = find_open_order(&txn, order_id).await?;

    let result = Order::update_many()
        .col_expr(order::Column::IsPaid, Expr::value(true))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::IsPaid.eq(false))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::validation("The order has already been paid for."));
    }

    set_table_status(&txn, order.table_id, lifecycle::table_status_for_order(true)).await?;
    let paid = find_order(&txn, order_id).await?;
    txn.commit().await?;

    info!(order_id, table_id = paid.table_id, "payment recorded");
    Ok(paid)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::menu::MAX_PRICE;
    use crate::core::table::{free_table, seat_table};
    use crate::entities::{DiningTable, TableStatus};
    use crate::errors::ErrorKind;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    async fn table_status(db: &DatabaseConnection, table_id: i64) -> TableStatus {
        DiningTable::find_by_id(table_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn test_order_input_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_order(&db, &waiter(), 1, &[NewOrderLine::new(1, 0)]).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = add_item(&db, &waiter(), 1, 1, 0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = set_item_qty(&db, &waiter(), 1, 1, -1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_order(&db, &client(1), 1, &[]).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::AuthorizationDenied);

        let result = pay_order(&db, &client(1), 1).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::AuthorizationDenied);

        Ok(())
    }

    #[tokio::test]
    async fn test_full_order_scenario() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 5).await?;
        let item = create_custom_menu_item(&db, "Tavche gravche", "TAV", 100).await?;
        assert_eq!(table.status, TableStatus::Available);

        let view = create_order(&db, &waiter(), table.id, &[NewOrderLine::new(item.id, 2)]).await?;
        assert_eq!(view.total, 200);
        assert!(!view.order.is_paid);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Occupied);

        let view = add_item(&db, &waiter(), view.order.id, item.id, 1).await?;
        assert_eq!(view.total, 300);
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].item.quantity, 3);

        let paid = pay_order(&db, &manager(), view.order.id).await?;
        assert!(paid.is_paid);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Available);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_merges_repeated_items() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let soup = create_custom_menu_item(&db, "Soup", "SOUP", 120).await?;
        let bread = create_custom_menu_item(&db, "Bread", "BRD", 30).await?;

        let view = create_order(
            &db,
            &waiter(),
            table.id,
            &[
                NewOrderLine::new(soup.id, 1),
                NewOrderLine::new(bread.id, 2),
                NewOrderLine::new(soup.id, 2),
            ],
        )
        .await?;
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].menu_item.id, soup.id);
        assert_eq!(view.lines[0].item.quantity, 3);
        assert_eq!(view.total, 3 * 120 + 2 * 30);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_on_reserved_table_fails() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 3).await?;
        let item = create_test_menu_item(&db, "SALAD").await?;
        let reservation = create_test_reservation(&db, table.id).await?;
        crate::core::reservation::approve_reservation(&db, &manager(), reservation.id).await?;

        let result =
            create_order(&db, &waiter(), table.id, &[NewOrderLine::new(item.id, 1)]).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.to_string(), "Table is reserved. Seat the guests first.");

        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Reserved);

        // Seating the guests lifts the hold
        seat_table(&db, &waiter(), table.id).await?;
        create_order(&db, &waiter(), table.id, &[NewOrderLine::new(item.id, 1)]).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_second_unpaid_order_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        create_order(&db, &waiter(), table.id, &[]).await?;

        let result = create_order(&db, &manager(), table.id, &[]).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.to_string(), ACTIVE_ORDER_EXISTS);
        assert_eq!(Order::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_store_rejects_second_unpaid_order() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        create_order(&db, &waiter(), table.id, &[]).await?;

        // Bypass the pre-check: the partial unique index must still refuse it
        let result = order::ActiveModel {
            table_id: Set(table.id),
            is_paid: Set(false),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .map_err(Error::from);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);

        // Paid orders do not count against the constraint
        order::ActiveModel {
            table_id: Set(table.id),
            is_paid: Set(true),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_orders_on_one_table() -> Result<()> {
        let (db, _dir) = setup_file_test_db().await?;

        let item = create_test_menu_item(&db, "TAV").await?;
        let staff = waiter();
        let boss = manager();
        let lines = [NewOrderLine::new(item.id, 1)];

        for number in 1..=10 {
            let table = create_test_table(&db, number).await?;

            let (left, right) = tokio::join!(
                create_order(&db, &staff, table.id, &lines),
                create_order(&db, &boss, table.id, &lines),
            );
            let outcomes = [left, right];
            assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
            let failure = outcomes.into_iter().find_map(std::result::Result::err).unwrap();
            assert!(
                matches!(
                    failure.kind(),
                    ErrorKind::ValidationFailed | ErrorKind::Conflict
                ),
                "losing order surfaced as {failure:?}"
            );

            let unpaid = Order::find()
                .filter(order::Column::TableId.eq(table.id))
                .filter(order::Column::IsPaid.eq(false))
                .count(&db)
                .await?;
            assert_eq!(unpaid, 1);
            assert_eq!(table_status(&db, table.id).await, TableStatus::Occupied);
        }

        // The losing transactions left no stray lines behind
        assert_eq!(OrderItem::find().count(&db).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_new_order_after_payment() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let first = create_order(&db, &waiter(), table.id, &[]).await?;
        pay_order(&db, &waiter(), first.order.id).await?;

        let second = create_order(&db, &waiter(), table.id, &[]).await?;
        assert_ne!(first.order.id, second.order.id);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Occupied);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_unknown_references() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_order(&db, &waiter(), 999, &[]).await;
        assert_eq!(result.unwrap_err().to_string(), "Table does not exist.");

        let table = create_test_table(&db, 1).await?;
        let result = create_order(&db, &waiter(), table.id, &[NewOrderLine::new(999, 1)]).await;
        assert_eq!(result.unwrap_err().to_string(), UNKNOWN_MENU_ITEM);
        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Available);

        Ok(())
    }

    #[tokio::test]
    async fn test_pay_twice_fails() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let item = create_test_menu_item(&db, "TEA").await?;
        let view = create_order(&db, &waiter(), table.id, &[NewOrderLine::new(item.id, 1)]).await?;

        pay_order(&db, &waiter(), view.order.id).await?;
        let result = pay_order(&db, &waiter(), view.order.id).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.to_string(), "The order has already been paid for.");

        let order = get_order(&db, &waiter(), view.order.id).await?;
        assert!(order.order.is_paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_paid_order_is_immutable() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let item = create_test_menu_item(&db, "TEA").await?;
        let view = create_order(&db, &waiter(), table.id, &[NewOrderLine::new(item.id, 1)]).await?;
        let line_id = view.lines[0].item.id;
        pay_order(&db, &waiter(), view.order.id).await?;

        for result in [
            add_item(&db, &waiter(), view.order.id, item.id, 1).await,
            set_item_qty(&db, &waiter(), view.order.id, line_id, 4).await,
            remove_item(&db, &waiter(), view.order.id, line_id).await,
        ] {
            assert_eq!(
                result.unwrap_err().to_string(),
                "The order has already been paid for."
            );
        }

        let order = get_order(&db, &waiter(), view.order.id).await?;
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].item.quantity, 1);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Available);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_and_remove_items() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let soup = create_custom_menu_item(&db, "Soup", "SOUP", 120).await?;
        let wine = create_custom_menu_item(&db, "Wine", "WINE", 300).await?;
        let view = create_order(
            &db,
            &waiter(),
            table.id,
            &[NewOrderLine::new(soup.id, 1), NewOrderLine::new(wine.id, 1)],
        )
        .await?;
        assert_eq!(view.total, 420);
        let soup_line = view.lines[0].item.id;
        let wine_line = view.lines[1].item.id;

        let view = set_item_qty(&db, &waiter(), view.order.id, soup_line, 4).await?;
        assert_eq!(view.total, 4 * 120 + 300);

        let view = remove_item(&db, &waiter(), view.order.id, wine_line).await?;
        assert_eq!(view.total, 480);
        assert_eq!(view.lines.len(), 1);

        let view = remove_item(&db, &waiter(), view.order.id, soup_line).await?;
        assert_eq!(view.total, 0);
        assert!(view.lines.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_line_lookup_is_scoped_to_order() -> Result<()> {
        let db = setup_test_db().await?;

        let first_table = create_test_table(&db, 1).await?;
        let second_table = create_test_table(&db, 2).await?;
        let item = create_test_menu_item(&db, "TEA").await?;
        let first =
            create_order(&db, &waiter(), first_table.id, &[NewOrderLine::new(item.id, 1)]).await?;
        let second =
            create_order(&db, &waiter(), second_table.id, &[NewOrderLine::new(item.id, 1)])
                .await?;
        let foreign_line = second.lines[0].item.id;

        let result = set_item_qty(&db, &waiter(), first.order.id, foreign_line, 2).await;
        assert_eq!(result.unwrap_err().to_string(), UNKNOWN_LINE);

        let result = remove_item(&db, &waiter(), first.order.id, foreign_line).await;
        assert_eq!(result.unwrap_err().to_string(), UNKNOWN_LINE);

        let result = remove_item(&db, &waiter(), first.order.id, 9999).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ValidationFailed);

        let untouched = get_order(&db, &waiter(), second.order.id).await?;
        assert_eq!(untouched.lines[0].item.quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_unknown_menu_item() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let view = create_order(&db, &waiter(), table.id, &[]).await?;

        let result = add_item(&db, &waiter(), view.order.id, 999, 1).await;
        assert_eq!(result.unwrap_err().to_string(), UNKNOWN_MENU_ITEM);

        let result = add_item(&db, &waiter(), 999, 1, 1).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);

        Ok(())
    }

    #[tokio::test]
    async fn test_free_blocked_by_unpaid_order() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let view = create_order(&db, &waiter(), table.id, &[]).await?;

        let result = free_table(&db, &waiter(), table.id).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.to_string(), "Table has an active unpaid order.");
        assert_eq!(table_status(&db, table.id).await, TableStatus::Occupied);

        pay_order(&db, &waiter(), view.order.id).await?;
        let freed = free_table(&db, &waiter(), table.id).await?;
        assert_eq!(freed.status, TableStatus::Available);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_with_overflowing_total_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let table = create_test_table(&db, 1).await?;
        let mut lines = Vec::new();
        for code in ["GOLD", "PLAT", "IRID"] {
            let item = create_custom_menu_item(&db, code, code, MAX_PRICE).await?;
            lines.push(NewOrderLine::new(item.id, i32::MAX));
        }

        let result = create_order(&db, &waiter(), table.id, &lines).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.to_string(), "The order total is too large.");

        // Nothing from the rejected order is kept
        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(OrderItem::find().count(&db).await?, 0);
        assert_eq!(table_status(&db, table.id).await, TableStatus::Available);

        // Two such lines still fit
        let view = create_order(&db, &waiter(), table.id, &lines[..2]).await?;
        assert_eq!(view.total, 2 * MAX_PRICE * i64::from(i32::MAX));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() -> Result<()> {
        let db = setup_test_db().await?;

        let first_table = create_test_table(&db, 1).await?;
        let second_table = create_test_table(&db, 2).await?;
        let item = create_custom_menu_item(&db, "Soup", "SOUP", 120).await?;
        let first =
            create_order(&db, &waiter(), first_table.id, &[NewOrderLine::new(item.id, 1)]).await?;
        let second =
            create_order(&db, &waiter(), second_table.id, &[NewOrderLine::new(item.id, 2)])
                .await?;

        let orders = list_orders(&db, &manager()).await?;
        assert_eq!(orders.len(), 2);
        let ids: Vec<i64> = orders.iter().map(|o| o.order.id).collect();
        assert!(ids.contains(&first.order.id));
        assert!(ids.contains(&second.order.id));
        let totals: i64 = orders.iter().map(|o| o.total).sum();
        assert_eq!(totals, 360);

        let result = list_orders(&db, &client(1)).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::AuthorizationDenied);

        Ok(())
    }
}
