//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the floor, menu, reservation and order tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod reservation;
pub mod user;
pub mod zone;

// Re-export specific types to avoid conflicts
pub use dining_table::{
    Column as DiningTableColumn, Entity as DiningTable, Model as DiningTableModel, TableStatus,
};
pub use menu_item::{
    Column as MenuItemColumn, Entity as MenuItem, MenuItemType, Model as MenuItemModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use reservation::{
    Column as ReservationColumn, Entity as Reservation, Model as ReservationModel,
    ReservationStatus,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
pub use zone::{Column as ZoneColumn, Entity as Zone, Model as ZoneModel, ZoneType};
