use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::user::CurrentUser,
    repositories::meal as meal_repo,
    state::AppState,
    validation::meal::{validate_meal, MealPayload},
};

/// Query parameters for listing meals.
#[derive(Deserialize)]
pub struct ListMealsQuery {
    /// Exact calendar date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// Year-month prefix, `YYYY-MM`.
    #[serde(default)]
    pub month: Option<String>,
}

/// Lists the authenticated user's meals, newest first.
#[axum::debug_handler]
pub async fn list_meals(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListMealsQuery>,
) -> Result<Response> {
    // An empty `?date=` or `?month=` means "no filter", not "empty date".
    let meals = meal_repo::list(
        &state.db,
        current.0.id,
        query.date.as_deref().filter(|d| !d.is_empty()),
        query.month.as_deref().filter(|m| !m.is_empty()),
    )
    .await?;

    tracing::debug!("Returning {} meals for user {}", meals.len(), current.0.id);
    Ok((StatusCode::OK, Json(meals)).into_response())
}

/// Creates a meal for the authenticated user.
#[axum::debug_handler]
pub async fn create_meal(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<MealPayload>,
) -> Result<Response> {
    let fields = validate_meal(payload)?;
    let meal = meal_repo::create(&state.db, current.0.id, &fields).await?;

    tracing::info!("Meal {} created for user {}", meal.id, current.0.id);
    Ok((StatusCode::CREATED, Json(meal)).into_response())
}

/// Fetches one of the authenticated user's meals.
#[axum::debug_handler]
pub async fn get_meal(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(meal_id): Path<i64>,
) -> Result<Response> {
    let meal = meal_repo::get(&state.db, current.0.id, meal_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((StatusCode::OK, Json(meal)).into_response())
}

/// Updates one of the authenticated user's meals, replacing its serving and
/// alt-measure rows wholesale.
#[axum::debug_handler]
pub async fn update_meal(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(meal_id): Path<i64>,
    Json(payload): Json<MealPayload>,
) -> Result<Response> {
    let fields = validate_meal(payload)?;
    let meal = meal_repo::update(&state.db, current.0.id, meal_id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!("Meal {} updated for user {}", meal.id, current.0.id);
    Ok((StatusCode::OK, Json(meal)).into_response())
}

/// Deletes one of the authenticated user's meals; serving and alt-measure
/// rows cascade.
#[axum::debug_handler]
pub async fn delete_meal(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(meal_id): Path<i64>,
) -> Result<Response> {
    if !meal_repo::delete(&state.db, current.0.id, meal_id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!("Meal {} deleted for user {}", meal_id, current.0.id);
    Ok((StatusCode::OK, r#"{"message":"Meal deleted successfully"}"#).into_response())
}
