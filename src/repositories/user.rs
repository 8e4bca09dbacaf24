use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use crate::{
    error::{AppError, Result},
    models::user::{User, UserCredentials},
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Creates a new user in the database.
///
/// A unique violation on `email` surfaces as `AppError::Conflict`.
pub async fn create_user(
    pool: &Pool,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, created_at
            "#,
            &[&email, &password_hash, &name],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                AppError::Conflict("User with this email already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
    row_to_user(&row)
}

/// Finds a user and their password hash by email address.
pub async fn find_credentials_by_email(pool: &Pool, email: &str) -> Result<Option<UserCredentials>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, name, created_at, password_hash
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| {
        Ok(UserCredentials {
            user: row_to_user(&r)?,
            password_hash: r.try_get("password_hash")?,
        })
    })
    .transpose()
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: i64) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, name, created_at
            FROM users
            WHERE id = $1
            "#,
            &[&user_id],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}
