use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The claims carried by a session token.
///
/// The token is a signed pointer to a session row; its own `exp` is aligned
/// with the session TTL but verified independently, before any database
/// lookup happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The session id the token refers to.
    pub sid: Uuid,
    /// The owning user id.
    pub uid: i64,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs a token embedding the session and user ids.
pub fn encode_token(
    secret: &str,
    session_id: Uuid,
    user_id: i64,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sid: session_id,
        uid: user_id,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies a token's signature and expiry claim.
///
/// Any failure (malformed, tampered, expired) collapses to `None`; the
/// embedded session id must never be trusted before this check passes.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Token rejected: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn encode_then_decode_returns_the_same_ids() {
        let sid = Uuid::new_v4();
        let token = encode_token(SECRET, sid, 42, 24).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sid, sid);
        assert_eq!(claims.uid, 42);
    }

    #[test]
    fn any_single_byte_tamper_is_rejected() {
        let token = encode_token(SECRET, Uuid::new_v4(), 7, 24).unwrap();
        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] = if tampered[i] == b'A' { b'B' } else { b'A' };
            if tampered == bytes {
                continue;
            }
            let tampered = String::from_utf8_lossy(&tampered).to_string();
            assert!(
                decode_token(SECRET, &tampered).is_none(),
                "tampered byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(SECRET, Uuid::new_v4(), 7, 24).unwrap();
        assert!(decode_token("other-secret", &token).is_none());
    }

    #[test]
    fn expired_claim_is_rejected() {
        let token = encode_token(SECRET, Uuid::new_v4(), 7, -1).unwrap();
        assert!(decode_token(SECRET, &token).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_token(SECRET, "").is_none());
        assert!(decode_token(SECRET, "not.a.token").is_none());
    }
}
