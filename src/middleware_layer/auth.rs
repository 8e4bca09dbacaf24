use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::user::CurrentUser,
    repositories::{session as session_repo, user as user_repo},
    services::token,
    state::AppState,
};

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// A middleware that resolves the authenticated user for protected routes.
///
/// Cookie -> verified token -> unexpired session row -> user row; a failure
/// at any stage collapses to the same 401, with the specifics only in the
/// server logs. The token signature check happens before any database access.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| {
            tracing::debug!("No session cookie on request");
            unauthenticated()
        })?;

    let claims = token::decode_token(&state.config.session_secret, &token).ok_or_else(|| {
        tracing::debug!("Session token failed verification");
        unauthenticated()
    })?;

    let session = session_repo::find_valid(&state.db, claims.sid)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Session {} missing or expired", claims.sid);
            unauthenticated()
        })?;

    let user = user_repo::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Session {} references missing user {}", session.id, session.user_id);
            unauthenticated()
        })?;

    tracing::debug!("User {} authenticated", user.id);
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn unauthenticated() -> AppError {
    AppError::Authentication("Not authenticated".to_string())
}
