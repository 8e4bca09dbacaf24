use crate::error::{AppError, Result};
use crate::models::session::Session;
use crate::models::user::User;
use crate::repositories::session as session_repo;
use crate::repositories::user as user_repo;
use crate::state::AppState;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Hashes a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let argon2 = Argon2::default();
    let result = argon2.verify_password(&password_bytes, &parsed_hash).is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Creates a new user with a hashed password.
pub async fn create_user(
    state: &AppState,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User> {
    tracing::debug!("Creating user: {}", email);
    let hashed_password = hash_password(password)?;
    let user = user_repo::create_user(&state.db, email, &hashed_password, name).await?;
    tracing::info!("User created with ID: {}", user.id);
    Ok(user)
}

/// Verifies an email/password pair.
///
/// Returns `None` for an unknown email and for a wrong password alike, so
/// callers cannot leak which one failed.
pub async fn verify_credentials(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<Option<User>> {
    let Some(credentials) = user_repo::find_credentials_by_email(&state.db, email).await? else {
        tracing::debug!("Login failed: unknown email");
        return Ok(None);
    };

    if !verify_password(password, &credentials.password_hash)? {
        tracing::debug!("Login failed: wrong password for user {}", credentials.user.id);
        return Ok(None);
    }

    Ok(Some(credentials.user))
}

/// Creates a session for a user, expiring after the configured TTL.
pub async fn create_session(state: &AppState, user_id: i64) -> Result<Session> {
    let id = Uuid::new_v4();
    let expires_at = Utc::now() + chrono::Duration::hours(state.config.session_ttl_hours);
    let session = session_repo::create(&state.db, id, user_id, expires_at).await?;
    tracing::debug!("Session {} created for user {}", session.id, user_id);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("demo123").unwrap();
        assert_ne!(hash, "demo123");
        assert!(verify_password("demo123", &hash).unwrap());
        assert!(!verify_password("demo124", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("demo123").unwrap();
        let b = hash_password("demo123").unwrap();
        assert_ne!(a, b);
    }
}
