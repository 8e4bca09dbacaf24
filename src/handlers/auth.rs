use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::SESSION_COOKIE,
    models::user::{CurrentUser, User},
    services::{auth as auth_service, token},
    state::AppState,
    validation::auth::*,
};

/// The request payload for signup. Fields are optional so missing ones
/// surface as a 400 rather than a deserialization rejection.
#[derive(Deserialize, Debug)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// The request payload for login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn user_json(user: &User) -> sonic_rs::Value {
    sonic_rs::json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
    })
}

/// Creates the session cookie carrying the signed token.
fn session_cookie(token: String, ttl_hours: i64, production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    if production {
        cookie.set_secure(true);
    }
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(ttl_hours * 3600));
    cookie.set_path("/");
    cookie
}

/// Starts a session for `user` and attaches the cookie.
async fn establish_session(state: &AppState, cookies: &Cookies, user: &User) -> Result<()> {
    let session = auth_service::create_session(state, user.id).await?;
    let token = token::encode_token(
        &state.config.session_secret,
        session.id,
        user.id,
        state.config.session_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

    cookies.add(session_cookie(
        token,
        state.config.session_ttl_hours,
        state.config.is_production(),
    ));
    tracing::info!("Session {} established for user {}", session.id, user.id);
    Ok(())
}

/// Handles user signup, logging the new user in immediately.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupRequest>,
) -> Result<Response> {
    let (Some(email), Some(password), Some(name)) =
        (payload.email, payload.password, payload.name)
    else {
        return Err(AppError::Validation(
            "Email, password, and name are required".to_string(),
        ));
    };

    validate_email(&email)?;
    validate_password(&password, state.config.password_min_len)?;
    validate_name(&name)?;

    let user = auth_service::create_user(&state, &email, &password, &name).await?;
    establish_session(&state, &cookies, &user).await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "message": "User created successfully",
        "user": user_json(&user),
    }))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, body).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = auth_service::verify_credentials(&state, &email, &password)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

    establish_session(&state, &cookies, &user).await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "message": "Login successful",
        "user": user_json(&user),
    }))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, body).into_response())
}

/// Handles logout: revokes the session row and clears the cookie.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    cookies: Cookies,
) -> Result<Response> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if let Some(claims) = token::decode_token(&state.config.session_secret, cookie.value()) {
            crate::repositories::session::delete(&state.db, claims.sid).await?;
            tracing::info!("Session {} revoked for user {}", claims.sid, current.0.id);
        }
    }

    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookies.remove(cookie);

    Ok((StatusCode::OK, r#"{"message":"Logout successful"}"#).into_response())
}

/// Returns the authenticated user.
#[axum::debug_handler]
pub async fn me(Extension(current): Extension<CurrentUser>) -> Result<Response> {
    let body = sonic_rs::to_string(&sonic_rs::json!({
        "user": user_json(&current.0),
    }))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, body).into_response())
}
