use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    services::nutrition,
    state::AppState,
};

#[derive(Deserialize, Debug)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NutrientsRequest {
    pub food_name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MeasureRequest {
    pub food_name: Option<String>,
    #[serde(default)]
    pub measure: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

fn passthrough(value: sonic_rs::Value) -> Result<Response> {
    let body = sonic_rs::to_string(&value).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((StatusCode::OK, body).into_response())
}

/// Instant food search against the nutrition catalog.
#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Response> {
    let query = payload
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Query is required".to_string()))?;

    passthrough(nutrition::search(&state, &query).await?)
}

/// Detailed nutrition values for a food name.
#[axum::debug_handler]
pub async fn nutrients(
    State(state): State<AppState>,
    Json(payload): Json<NutrientsRequest>,
) -> Result<Response> {
    let food_name = payload
        .food_name
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Food name is required".to_string()))?;

    passthrough(nutrition::nutrients(&state, &food_name).await?)
}

/// Nutrition values for a specific measure/quantity of a food.
#[axum::debug_handler]
pub async fn measure(
    State(state): State<AppState>,
    Json(payload): Json<MeasureRequest>,
) -> Result<Response> {
    let food_name = payload
        .food_name
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Food name is required".to_string()))?;

    passthrough(
        nutrition::measure(
            &state,
            &food_name,
            payload.measure.as_deref(),
            payload.quantity,
        )
        .await?,
    )
}
