//! Read-side projections - order views with recomputed totals and the table
//! status overview.
//!
//! Totals are never stored. Every view is built from the current order lines
//! and menu prices, so a view can never drift from line-item state. Lines are
//! always fetched in bulk for a set of orders; building N views costs the same
//! number of queries as building one. Totals use checked arithmetic; a total
//! that does not fit in `i64` is a validation error, never a wrap or a panic.

use crate::{
    core::access::{Actor, Operation, authorize},
    entities::{
        DiningTable, MenuItem, Order, OrderItem, dining_table, menu_item, order, order_item,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// The stored line
    #[serde(flatten)]
    pub item: order_item::Model,
    /// The menu item the line refers to, with its current price
    pub menu_item: menu_item::Model,
}

const TOTAL_TOO_LARGE: &str = "The order total is too large.";

impl OrderLine {
    /// Unit price times quantity.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the product overflows.
    pub fn subtotal(&self) -> Result<i64> {
        self.menu_item
            .price
            .checked_mul(i64::from(self.item.quantity))
            .ok_or_else(|| Error::validation(TOTAL_TOO_LARGE))
    }
}

/// An order with its lines and recomputed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    /// The stored order
    #[serde(flatten)]
    pub order: order::Model,
    /// Lines in insertion order
    pub lines: Vec<OrderLine>,
    /// Sum of line subtotals
    pub total: i64,
}

impl OrderView {
    fn new(order: order::Model, lines: Vec<OrderLine>) -> Result<Self> {
        let total = order_total(&lines)?;
        Ok(Self {
            order,
            lines,
            total,
        })
    }
}

/// Summary of a table's unpaid order for the floor overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveOrderSummary {
    /// The unpaid order
    pub order_id: i64,
    /// Number of distinct lines on the order
    pub items_count: usize,
    /// Recomputed total
    pub total: i64,
}

/// One row of the floor overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStatusRow {
    /// The table as stored
    #[serde(flatten)]
    pub table: dining_table::Model,
    /// The table's unpaid order, if any
    pub active_order: Option<ActiveOrderSummary>,
}

/// Sums unit price times quantity over `lines`.
///
/// # Errors
/// Returns `Error::Validation` if a subtotal or the sum overflows.
pub fn order_total(lines: &[OrderLine]) -> Result<i64> {
    lines.iter().try_fold(0_i64, |total, line| {
        total
            .checked_add(line.subtotal()?)
            .ok_or_else(|| Error::validation(TOTAL_TOO_LARGE))
    })
}

/// Fetches the lines of every order in `order_ids` with one query, grouped by
/// order id.
pub(crate) async fn load_lines<C>(
    conn: &C,
    order_ids: &[i64],
) -> Result<HashMap<i64, Vec<OrderLine>>>
where
    C: ConnectionTrait,
{
    let mut grouped: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.is_in(order_ids.iter().copied()))
        .order_by_asc(order_item::Column::Id)
        .find_also_related(MenuItem)
        .all(conn)
        .await?;

    for (item, menu_item) in rows {
        let Some(menu_item) = menu_item else {
            warn!(order_item_id = item.id, "order line without menu item skipped");
            continue;
        };
        grouped
            .entry(item.order_id)
            .or_default()
            .push(OrderLine { item, menu_item });
    }
    Ok(grouped)
}

/// Builds views for `orders`, preserving their order.
pub(crate) async fn build_order_views<C>(
    conn: &C,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderView>>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut lines = load_lines(conn, &ids).await?;
    orders
        .into_iter()
        .map(|order| {
            let order_lines = lines.remove(&order.id).unwrap_or_default();
            OrderView::new(order, order_lines)
        })
        .collect()
}

/// Re-reads an order and its lines from the store.
///
/// Used after every line mutation so callers never see a stale view.
pub(crate) async fn load_order_view<C>(conn: &C, order_id: i64) -> Result<OrderView>
where
    C: ConnectionTrait,
{
    let order = Order::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Order",
            id: order_id,
        })?;
    let mut views = build_order_views(conn, vec![order]).await?;
    views.pop().ok_or(Error::NotFound {
        entity: "Order",
        id: order_id,
    })
}

/// Lists every table joined with its unpaid order summary.
///
/// Unpaid orders and their lines are fetched in bulk, not per table.
pub async fn table_status_overview(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<TableStatusRow>> {
    authorize(actor, Operation::ViewTableStatus)?;

    let tables = DiningTable::find()
        .order_by_asc(dining_table::Column::Number)
        .all(db)
        .await?;
    let unpaid = Order::find()
        .filter(order::Column::IsPaid.eq(false))
        .all(db)
        .await?;

    let mut active_by_table: HashMap<i64, ActiveOrderSummary> = build_order_views(db, unpaid)
        .await?
        .into_iter()
        .map(|view| {
            (
                view.order.table_id,
                ActiveOrderSummary {
                    order_id: view.order.id,
                    items_count: view.lines.len(),
                    total: view.total,
                },
            )
        })
        .collect();

    Ok(tables
        .into_iter()
        .map(|table| {
            let active_order = active_by_table.remove(&table.id);
            TableStatusRow {
                table,
                active_order,
            }
        })
        .collect())
}
