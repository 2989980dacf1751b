//! User business logic - Registration and the "me" lookup.
//!
//! Credentials and sessions belong to the identity provider in front of this
//! crate. What is stored here is the user's identity and role, which the
//! provider hands back as an [`Actor`] on every call.

use crate::{
    core::access::{Actor, Operation, authorize},
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Sign-up data for a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Login name, unique
    pub username: String,
    /// Contact address, unique
    pub email: String,
    /// Role to act in
    pub role: Role,
}

/// Public view of the calling user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// User id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Role
    pub role: Role,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
        }
    }
}

/// Creates a user.
///
/// Public sign-up should pass [`Role::Client`]; staff accounts are normally
/// created from the floor configuration.
///
/// # Errors
/// Returns an error if:
/// - The username is blank or the email has no `@`
/// - The username or email is already registered
pub async fn register_user(
    db: &DatabaseConnection,
    registration: Registration,
) -> Result<user::Model> {
    let username = registration.username.trim().to_string();
    let email = registration.email.trim().to_string();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty."));
    }
    if !email.contains('@') {
        return Err(Error::validation("Enter a valid email address."));
    }

    let created = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        role: Set(registration.role),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        Error::from(e).conflict_as_validation("User with this username or email already exists")
    })?;

    info!(user_id = created.id, role = ?created.role, "user registered");
    Ok(created)
}

/// Returns the profile of the calling user.
///
/// # Errors
/// Returns `Error::NotFound` if the actor's user record no longer exists.
pub async fn current_actor(db: &DatabaseConnection, actor: &Actor) -> Result<UserProfile> {
    authorize(actor, Operation::ViewProfile)?;
    User::find_by_id(actor.user_id)
        .one(db)
        .await?
        .map(UserProfile::from)
        .ok_or(Error::NotFound {
            entity: "User",
            id: actor.user_id,
        })
}
