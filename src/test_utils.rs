//! Shared test utilities for `RestaurantBook`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating floor entities and actors with sensible defaults.

use crate::{
    core::{
        access::Actor,
        menu::{self, MenuItemDraft},
        reservation::{self, NewReservation},
        table::{self, TableLayout},
        user::{self, Registration},
    },
    entities::{self, MenuItemType, Role, User},
    errors::Result,
};
use chrono::{TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
///
/// The pool holds a single connection: every `sqlite::memory:` connection is
/// its own database, so a second one would see empty tables.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database whose pool holds several
/// connections, so concurrent operations really run in separate transactions.
///
/// The returned directory owns the database file; keep it alive for as long as
/// the connection is used.
pub async fn setup_file_test_db() -> Result<(DatabaseConnection, TempDir)> {
    let dir = tempfile::tempdir().map_err(|e| crate::errors::Error::Config {
        message: format!("Failed to create temporary directory: {e}"),
    })?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("floor.sqlite").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(4)
        .min_connections(2)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, dir))
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// A manager actor. No user row is required for staff operations.
pub const fn manager() -> Actor {
    Actor::new(9001, Role::Manager)
}

/// A waiter actor. No user row is required for staff operations.
pub const fn waiter() -> Actor {
    Actor::new(9002, Role::Waiter)
}

/// A client actor for the given user id.
pub const fn client(user_id: i64) -> Actor {
    Actor::new(user_id, Role::Client)
}

/// Creates a test table with sensible defaults.
///
/// # Defaults
/// * `chairs`: 4
/// * position: top 0, left `number * 100`
pub async fn create_test_table(
    db: &DatabaseConnection,
    number: i32,
) -> Result<entities::dining_table::Model> {
    table::create_table(
        db,
        &manager(),
        TableLayout {
            number,
            chairs: 4,
            top: 0.0,
            left: f64::from(number) * 100.0,
        },
    )
    .await
}

/// Creates a test food item priced at 100 with the given code.
pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::menu_item::Model> {
    create_custom_menu_item(db, code, code, 100).await
}

/// Creates a test food item with custom name, code and price.
pub async fn create_custom_menu_item(
    db: &DatabaseConnection,
    name: &str,
    code: &str,
    price: i64,
) -> Result<entities::menu_item::Model> {
    menu::create_menu_item(
        db,
        &manager(),
        MenuItemDraft {
            name: name.to_string(),
            item_type: MenuItemType::Food,
            price,
            code: code.to_string(),
        },
    )
    .await
}

/// Registers a test user with an `@example.com` address derived from the
/// username.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> Result<entities::user::Model> {
    user::register_user(
        db,
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
        },
    )
    .await
}

/// The datetime used by [`create_test_reservation`].
pub fn test_reservation_datetime() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 19, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a pending reservation on `table_id` for a freshly registered client.
///
/// Every call registers a new client, so several reservations on the same
/// table and datetime come from different users.
pub async fn create_test_reservation(
    db: &DatabaseConnection,
    table_id: i64,
) -> Result<entities::reservation::Model> {
    let existing = User::find().count(db).await?;
    let guest = create_test_user(db, &format!("guest{}", existing + 1), Role::Client).await?;
    reservation::create_reservation(
        db,
        &client(guest.id),
        NewReservation {
            table_id,
            datetime: test_reservation_datetime(),
            description: "Test reservation".to_string(),
        },
    )
    .await
}
