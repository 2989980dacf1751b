//! Start-up seeding of the floor, menu and staff from the floor configuration.
//!
//! Runs on every launch. Entries that already exist are skipped, never
//! overwritten: tables are matched by number, menu items by code and users by
//! username. Zones carry no natural key, so they are only inserted into an
//! empty zone table.

use crate::{
    config::floor::FloorConfig,
    core::menu::MAX_PRICE,
    entities::{
        DiningTable, MenuItem, TableStatus, User, Zone, dining_table, menu_item, user, zone,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// How many rows of each kind a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// New tables
    pub tables: usize,
    /// New zones
    pub zones: usize,
    /// New menu items
    pub menu_items: usize,
    /// New users
    pub users: usize,
}

/// Applies `config` to the store in one transaction.
///
/// # Errors
/// Returns `Error::Config` for a table with fewer than one chair or a menu
/// price outside `0..=MAX_PRICE`, and any database error. Nothing is written
/// if an error occurs.
#[instrument(skip(db, config))]
pub async fn seed_floor(db: &DatabaseConnection, config: &FloorConfig) -> Result<SeedSummary> {
    info!(
        tables = config.tables.len(),
        zones = config.zones.len(),
        menu_items = config.menu_items.len(),
        users = config.users.len(),
        "Seeding floor from configuration"
    );

    let txn = db.begin().await?;
    let summary = SeedSummary {
        tables: seed_tables(&txn, config).await?,
        zones: seed_zones(&txn, config).await?,
        menu_items: seed_menu_items(&txn, config).await?,
        users: seed_users(&txn, config).await?,
    };
    txn.commit().await?;

    info!(?summary, "Finished seeding floor");
    Ok(summary)
}

async fn seed_tables(txn: &DatabaseTransaction, config: &FloorConfig) -> Result<usize> {
    let mut inserted = 0;
    for table in &config.tables {
        if table.chairs < 1 {
            return Err(Error::Config {
                message: format!("Table {} needs at least one chair", table.number),
            });
        }
        let exists = DiningTable::find()
            .filter(dining_table::Column::Number.eq(table.number))
            .one(txn)
            .await?
            .is_some();
        if exists {
            debug!(number = table.number, "Table already exists. Skipping.");
            continue;
        }

        dining_table::ActiveModel {
            number: Set(table.number),
            chairs: Set(table.chairs),
            status: Set(TableStatus::Available),
            top: Set(table.top),
            left: Set(table.left),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn seed_zones(txn: &DatabaseTransaction, config: &FloorConfig) -> Result<usize> {
    if config.zones.is_empty() || Zone::find().count(txn).await? > 0 {
        return Ok(0);
    }
    for region in &config.zones {
        zone::ActiveModel {
            zone_type: Set(region.zone_type),
            top: Set(region.top),
            left: Set(region.left),
            width: Set(region.width),
            height: Set(region.height),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(config.zones.len())
}

async fn seed_menu_items(txn: &DatabaseTransaction, config: &FloorConfig) -> Result<usize> {
    let mut inserted = 0;
    for item in &config.menu_items {
        if !(0..=MAX_PRICE).contains(&item.price) {
            return Err(Error::Config {
                message: format!("Menu item {} has an invalid price {}", item.code, item.price),
            });
        }
        let exists = MenuItem::find()
            .filter(menu_item::Column::Code.eq(item.code.as_str()))
            .one(txn)
            .await?
            .is_some();
        if exists {
            debug!(code = %item.code, "Menu item already exists. Skipping.");
            continue;
        }

        menu_item::ActiveModel {
            name: Set(item.name.clone()),
            item_type: Set(item.item_type),
            price: Set(item.price),
            code: Set(item.code.clone()),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn seed_users(txn: &DatabaseTransaction, config: &FloorConfig) -> Result<usize> {
    let mut inserted = 0;
    for account in &config.users {
        let exists = User::find()
            .filter(user::Column::Username.eq(account.username.as_str()))
            .one(txn)
            .await?
            .is_some();
        if exists {
            debug!(username = %account.username, "User already exists. Skipping.");
            continue;
        }

        user::ActiveModel {
            username: Set(account.username.clone()),
            email: Set(account.email.clone()),
            role: Set(account.role),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}
