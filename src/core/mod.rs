//! Core business logic - framework-agnostic floor operations.
//!
//! Every public operation takes the store connection and the calling [`access::Actor`],
//! checks the access policy once, and returns [`crate::errors::Result`]. Transport
//! adapters sit on top of these functions and add nothing but (de)serialization.

/// Role-based access policy
pub mod access;
/// Pure transition rules for reservations, orders and tables
pub mod lifecycle;
/// Menu item maintenance
pub mod menu;
/// Order lifecycle: open, edit lines, pay
pub mod order;
/// Order views, totals and the table status overview
pub mod projection;
/// Reservation lifecycle: request, approve, reject
pub mod reservation;
/// Start-up seeding from the floor configuration
pub mod seed;
/// Table layout and seat/free actions
pub mod table;
/// Registration and profile lookup
pub mod user;
/// Floor-plan zones
pub mod zone;
