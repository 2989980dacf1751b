//! Menu business logic - Maintaining the priced food and drink list.
//!
//! Prices are integral currency units. Order totals are always recomputed from
//! these prices, so a menu item that appears on any order line cannot be
//! deleted.

use crate::{
    core::access::{Actor, Operation, authorize},
    entities::{MenuItem, MenuItemType, OrderItem, menu_item, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Highest accepted unit price, the range of a 32-bit integer column.
pub const MAX_PRICE: i64 = 2_147_483_647;

/// Editable fields of a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemDraft {
    /// Display name
    pub name: String,
    /// Food or drink
    pub item_type: MenuItemType,
    /// Unit price, from 0 to [`MAX_PRICE`]
    pub price: i64,
    /// Unique short code
    pub code: String,
}

impl MenuItemDraft {
    /// Trims text fields and checks the value ranges.
    fn normalized(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let code = self.code.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Menu item name cannot be empty."));
        }
        if code.is_empty() {
            return Err(Error::validation("Menu item code cannot be empty."));
        }
        if self.price < 0 {
            return Err(Error::validation("Price cannot be negative."));
        }
        if self.price > MAX_PRICE {
            return Err(Error::validation("Price is too large."));
        }
        Ok(Self {
            name,
            code,
            ..self
        })
    }
}

fn duplicate_code(code: &str) -> String {
    format!("Menu item with code {code} already exists.")
}

async fn find_menu_item(db: &DatabaseConnection, menu_item_id: i64) -> Result<menu_item::Model> {
    MenuItem::find_by_id(menu_item_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "MenuItem",
            id: menu_item_id,
        })
}

/// Lists the menu grouped by type, then alphabetically.
pub async fn list_menu_items(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<menu_item::Model>> {
    authorize(actor, Operation::ReadMenu)?;
    MenuItem::find()
        .order_by_asc(menu_item::Column::ItemType)
        .order_by_asc(menu_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one menu item.
///
/// # Errors
/// Returns `Error::NotFound` if the item does not exist.
pub async fn get_menu_item(
    db: &DatabaseConnection,
    actor: &Actor,
    menu_item_id: i64,
) -> Result<menu_item::Model> {
    authorize(actor, Operation::ReadMenu)?;
    find_menu_item(db, menu_item_id).await
}

/// Adds an item to the menu.
///
/// # Errors
/// Returns an error if:
/// - The actor is not a manager
/// - The name or code is blank, or the price is negative
/// - Another item already uses the code
pub async fn create_menu_item(
    db: &DatabaseConnection,
    actor: &Actor,
    draft: MenuItemDraft,
) -> Result<menu_item::Model> {
    authorize(actor, Operation::WriteMenu)?;
    let draft = draft.normalized()?;

    let message = duplicate_code(&draft.code);
    let item = menu_item::ActiveModel {
        name: Set(draft.name),
        item_type: Set(draft.item_type),
        price: Set(draft.price),
        code: Set(draft.code),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| Error::from(e).conflict_as_validation(&message))?;

    info!(menu_item_id = item.id, code = %item.code, "menu item created");
    Ok(item)
}

/// Replaces every editable field of a menu item.
///
/// Price changes apply to open orders as well, since totals are recomputed.
///
/// # Errors
/// Returns an error if the actor is not a manager, the draft is invalid, the
/// item does not exist, or the new code is taken.
pub async fn update_menu_item(
    db: &DatabaseConnection,
    actor: &Actor,
    menu_item_id: i64,
    draft: MenuItemDraft,
) -> Result<menu_item::Model> {
    authorize(actor, Operation::WriteMenu)?;
    let draft = draft.normalized()?;

    let message = duplicate_code(&draft.code);
    let mut item: menu_item::ActiveModel = find_menu_item(db, menu_item_id).await?.into();
    item.name = Set(draft.name);
    item.item_type = Set(draft.item_type);
    item.price = Set(draft.price);
    item.code = Set(draft.code);

    item.update(db)
        .await
        .map_err(|e| Error::from(e).conflict_as_validation(&message))
}

/// Removes a menu item that no order refers to.
///
/// # Errors
/// Returns an error if:
/// - The actor is not a manager
/// - The item does not exist
/// - Any order line refers to the item (`Error::Validation`)
pub async fn delete_menu_item(
    db: &DatabaseConnection,
    actor: &Actor,
    menu_item_id: i64,
) -> Result<()> {
    authorize(actor, Operation::WriteMenu)?;
    let item = find_menu_item(db, menu_item_id).await?;

    let used = OrderItem::find()
        .filter(order_item::Column::MenuItemId.eq(menu_item_id))
        .count(db)
        .await?;
    if used > 0 {
        return Err(Error::validation(
            "The menu item appears on orders and cannot be deleted.",
        ));
    }

    item.delete(db).await?;
    info!(menu_item_id, "menu item deleted");
    Ok(())
}
