use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a server-side user session.
///
/// A session is valid only while `now < expires_at`; an expired row is
/// treated as absent even before the sweep deletes it.
#[derive(Debug, Clone)]
pub struct Session {
    /// The opaque session identifier.
    pub id: Uuid,
    /// The ID of the user this session belongs to.
    pub user_id: i64,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
}
