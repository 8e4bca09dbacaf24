use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{error::Result, models::session::Session};

fn row_to_session(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Persists a new session row.
pub async fn create(
    pool: &Pool,
    id: Uuid,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> Result<Session> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at, created_at
            "#,
            &[&id, &user_id, &expires_at],
        )
        .await?;
    row_to_session(&row)
}

/// Returns the session only while unexpired. Expired rows are left in place
/// for the sweep; the time comparison here is what makes them invisible.
pub async fn find_valid(pool: &Pool, id: Uuid) -> Result<Option<Session>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, user_id, expires_at, created_at
            FROM sessions
            WHERE id = $1 AND expires_at > NOW()
            "#,
            &[&id],
        )
        .await?;
    row.map(|r| row_to_session(&r)).transpose()
}

/// Deletes a session. Idempotent: deleting an absent row is not an error.
pub async fn delete(pool: &Pool, id: Uuid) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute("DELETE FROM sessions WHERE id = $1", &[&id])
        .await?;
    Ok(())
}

/// Deletes all expired session rows, returning how many were removed.
pub async fn sweep_expired(pool: &Pool) -> Result<u64> {
    let client = pool.get().await?;
    let deleted = client
        .execute("DELETE FROM sessions WHERE expires_at <= NOW()", &[])
        .await?;
    Ok(deleted)
}
