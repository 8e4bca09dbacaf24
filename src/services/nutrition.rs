use sonic_rs::{JsonValueTrait, Value};
use crate::error::{AppError, Result};
use crate::services::translation;
use crate::state::AppState;

const SEARCH_URL: &str = "https://trackapi.nutritionix.com/v2/search/instant";
const NUTRIENTS_URL: &str = "https://trackapi.nutritionix.com/v2/natural/nutrients";

/// Calls a Nutritionix endpoint and passes the JSON body through opaquely.
async fn call(state: &AppState, url: &str, body: Value) -> Result<Value> {
    let (app_id, api_key) = match (
        &state.config.nutritionix_app_id,
        &state.config.nutritionix_api_key,
    ) {
        (Some(id), Some(key)) => (id, key),
        _ => {
            tracing::error!("Missing Nutritionix API credentials");
            return Err(AppError::Upstream {
                status: 500,
                message: "API configuration error".to_string(),
            });
        }
    };

    let response = state
        .http
        .post(url)
        .header("x-app-id", app_id)
        .header("x-app-key", api_key)
        .header("content-type", "application/json")
        .body(sonic_rs::to_string(&body).map_err(|e| AppError::Internal(e.to_string()))?)
        .send()
        .await
        .map_err(|e| AppError::Upstream {
            status: 502,
            message: format!("Failed to reach nutrition service: {}", e),
        })?;

    let status = response.status().as_u16();
    let text = response.text().await.map_err(|e| AppError::Upstream {
        status: 502,
        message: format!("Failed to read nutrition response: {}", e),
    })?;

    if !(200..300).contains(&status) {
        let message = sonic_rs::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("message").as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Failed to fetch data from Nutritionix".to_string());
        return Err(AppError::Upstream { status, message });
    }

    sonic_rs::from_str(&text).map_err(|e| AppError::Upstream {
        status: 502,
        message: format!("Invalid nutrition response: {}", e),
    })
}

/// Instant food search, for auto-complete.
pub async fn search(state: &AppState, query: &str) -> Result<Value> {
    call(state, SEARCH_URL, sonic_rs::json!({ "query": query })).await
}

/// Detailed nutrition values for a natural-language food name.
///
/// The catalog only understands English, so the name is translated before
/// the lookup; without a translation key it goes through as-is.
pub async fn nutrients(state: &AppState, food_name: &str) -> Result<Value> {
    let query = translation::translate(state, food_name, "PT", "EN").await;
    call(state, NUTRIENTS_URL, sonic_rs::json!({ "query": query })).await
}

/// Nutrition values for a specific measure and quantity of a food.
pub async fn measure(
    state: &AppState,
    food_name: &str,
    measure: Option<&str>,
    quantity: Option<f64>,
) -> Result<Value> {
    let food_name = translation::translate(state, food_name, "PT", "EN").await;
    let query = match (measure, quantity) {
        (Some(measure), Some(quantity)) => format!("{} {} {}", quantity, measure, food_name),
        _ => food_name,
    };
    tracing::debug!("Querying Nutritionix with: {}", query);
    call(state, NUTRIENTS_URL, sonic_rs::json!({ "query": query })).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use zeroize::Zeroizing;

    fn offline_state() -> AppState {
        let config = Config {
            database_url: "postgres://postgres@127.0.0.1:5432/mealtrack_test".to_string(),
            app_env: "development".to_string(),
            session_secret: Zeroizing::new("test-secret".to_string()),
            session_ttl_hours: 24,
            password_min_len: 6,
            port: 3000,
            nutritionix_app_id: None,
            nutritionix_api_key: None,
            deepl_api_key: None,
        };
        AppState {
            db: crate::db::create_pool(&config.database_url).unwrap(),
            http: reqwest::Client::new(),
            config,
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_as_configuration_error() {
        let state = offline_state();

        // The measure path runs the name through translation (a no-op here)
        // before refusing to call out without credentials.
        for result in [
            nutrients(&state, "banana").await,
            measure(&state, "banana", Some("cup, sliced"), Some(1.5)).await,
            search(&state, "banana").await,
        ] {
            match result {
                Err(AppError::Upstream { status, message }) => {
                    assert_eq!(status, 500);
                    assert_eq!(message, "API configuration error");
                }
                other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
            }
        }
    }
}
