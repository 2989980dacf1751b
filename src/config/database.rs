//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema matches the Rust structs without hand-written DDL. The partial unique
//! indexes that guard the floor invariants cannot be expressed on the entities and are
//! created with raw statements after the tables exist.

use crate::entities::{DiningTable, MenuItem, Order, OrderItem, Reservation, User, Zone};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/restaurant_book.sqlite?mode=rwc";

/// Store-level invariants. Each one is the authoritative guard for a
/// check-then-act path in `crate::core`.
const INVARIANT_INDEXES: [&str; 3] = [
    // At most one approved reservation per (table, datetime).
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_table_datetime_when_approved
        ON reservations (table_id, datetime)
        WHERE status = 'approved'",
    // At most one unpaid order per table.
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_active_order_per_table
        ON orders (table_id)
        WHERE is_paid = 0",
    // One line per menu item within an order.
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_order_menu_item
        ON order_items (order_id, menu_item_id)",
];

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and invariant indexes if they do not exist yet.
///
/// Parents are created before children so the foreign keys resolve.
#[instrument(skip(db))]
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, DiningTable).await?;
    create_table(db, &schema, User).await?;
    create_table(db, &schema, MenuItem).await?;
    create_table(db, &schema, Zone).await?;
    create_table(db, &schema, Reservation).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderItem).await?;

    for index in INVARIANT_INDEXES {
        db.execute_unprepared(index).await?;
    }

    info!("Database tables and invariant indexes ensured.");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement))
        .await?;
    Ok(())
}
