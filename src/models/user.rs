use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a user in the system.
///
/// Never carries the password hash; handlers can serialize it directly.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored password hash.
///
/// Only the credential-verification path in `services::auth` sees this.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// The authenticated user resolved by the auth middleware, attached to the
/// request as an extension.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);
