//! Zone business logic - Decorative regions drawn on the floor plan.

use crate::{
    core::access::{Actor, Operation, authorize},
    entities::{Zone, ZoneType, zone},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Placement and size of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneShape {
    /// Kind of area
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    /// Offset from the top
    pub top: f64,
    /// Offset from the left
    pub left: f64,
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl ZoneShape {
    fn validate(&self) -> Result<()> {
        let all_finite = [self.top, self.left, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::validation("Zone geometry must be finite numbers."));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::validation("Zone width and height must be positive."));
        }
        Ok(())
    }
}

async fn find_zone(db: &DatabaseConnection, zone_id: i64) -> Result<zone::Model> {
    Zone::find_by_id(zone_id).one(db).await?.ok_or(Error::NotFound {
        entity: "Zone",
        id: zone_id,
    })
}

/// Lists every zone in creation order.
pub async fn list_zones(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<zone::Model>> {
    authorize(actor, Operation::ReadFloor)?;
    Zone::find()
        .order_by_asc(zone::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one zone.
///
/// # Errors
/// Returns `Error::NotFound` if the zone does not exist.
pub async fn get_zone(db: &DatabaseConnection, actor: &Actor, zone_id: i64) -> Result<zone::Model> {
    authorize(actor, Operation::ReadFloor)?;
    find_zone(db, zone_id).await
}

/// Adds a zone to the floor plan.
///
/// # Errors
/// Returns an error if the actor is not a manager or the geometry is invalid.
pub async fn create_zone(
    db: &DatabaseConnection,
    actor: &Actor,
    shape: ZoneShape,
) -> Result<zone::Model> {
    authorize(actor, Operation::WriteFloor)?;
    shape.validate()?;

    let created = zone::ActiveModel {
        zone_type: Set(shape.zone_type),
        top: Set(shape.top),
        left: Set(shape.left),
        width: Set(shape.width),
        height: Set(shape.height),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(zone_id = created.id, zone_type = ?created.zone_type, "zone created");
    Ok(created)
}

/// Moves, resizes or retypes a zone.
///
/// # Errors
/// Returns an error if the actor is not a manager, the geometry is invalid or
/// the zone does not exist.
pub async fn update_zone(
    db: &DatabaseConnection,
    actor: &Actor,
    zone_id: i64,
    shape: ZoneShape,
) -> Result<zone::Model> {
    authorize(actor, Operation::WriteFloor)?;
    shape.validate()?;

    let mut active: zone::ActiveModel = find_zone(db, zone_id).await?.into();
    active.zone_type = Set(shape.zone_type);
    active.top = Set(shape.top);
    active.left = Set(shape.left);
    active.width = Set(shape.width);
    active.height = Set(shape.height);
    active.update(db).await.map_err(Into::into)
}

/// Removes a zone.
///
/// # Errors
/// Returns `Error::NotFound` if the zone does not exist.
pub async fn delete_zone(db: &DatabaseConnection, actor: &Actor, zone_id: i64) -> Result<()> {
    authorize(actor, Operation::WriteFloor)?;
    let result = Zone::delete_by_id(zone_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Zone",
            id: zone_id,
        });
    }
    Ok(())
}
