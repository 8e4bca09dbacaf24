use sonic_rs::{JsonValueTrait, Value};
use crate::state::AppState;

const DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";

/// Serving measures common enough that hitting the translation API for them
/// would be a waste. Matches the catalog's English measure names.
pub fn common_measure_pt(measure: &str) -> Option<&'static str> {
    let translated = match measure {
        "serving" => "porção",
        "cup" => "xícara",
        "cup, mashed" => "xícara, amassado",
        "cup, sliced" => "xícara, fatiado",
        "NLEA serving" => "porção NLEA",
        "oz" => "oz",
        "g" => "g",
        "tbsp" => "colher de sopa",
        "tsp" => "colher de chá",
        "slice" => "fatia",
        "piece" => "pedaço",
        "whole" => "inteiro",
        "package" => "pacote",
        "container" => "recipiente",
        "bottle" => "garrafa",
        "can" => "lata",
        "bowl" => "tigela",
        "plate" => "prato",
        "scoop" => "concha",
        "handful" => "punhado",
        "unit" => "unidade",
        "medium" => "médio",
        "large" => "grande",
        "small" => "pequeno",
        _ => return None,
    };
    Some(translated)
}

/// Translates `text` between languages via DeepL.
///
/// Degrades gracefully: a missing API key or any upstream failure returns the
/// original text instead of failing the caller's request.
pub async fn translate(state: &AppState, text: &str, source: &str, target: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    if source == "EN" && target == "PT" {
        if let Some(translated) = common_measure_pt(text) {
            return translated.to_string();
        }
    }

    let Some(api_key) = &state.config.deepl_api_key else {
        tracing::debug!("DEEPL_API_KEY not set, passing text through untranslated");
        return text.to_string();
    };

    let body = sonic_rs::json!({
        "text": [text],
        "source_lang": source,
        "target_lang": target,
    });

    let response = state
        .http
        .post(DEEPL_URL)
        .header("authorization", format!("DeepL-Auth-Key {}", api_key))
        .header("content-type", "application/json")
        .body(sonic_rs::to_string(&body).unwrap_or_default())
        .send()
        .await;

    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            tracing::warn!("DeepL API error ({}), using original text", r.status());
            return text.to_string();
        }
        Err(e) => {
            tracing::warn!("DeepL request failed ({}), using original text", e);
            return text.to_string();
        }
    };

    let parsed = match response.text().await {
        Ok(body) => sonic_rs::from_str::<Value>(&body).ok(),
        Err(_) => None,
    };

    parsed
        .and_then(|v| {
            v.get("translations")
                .get(0)
                .get("text")
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| {
            tracing::warn!("Unexpected DeepL response shape, using original text");
            text.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use zeroize::Zeroizing;

    /// A state with no upstream credentials; the pool is lazy and never
    /// connects.
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

    #[test]
    fn common_measures_skip_the_api() {
        assert_eq!(common_measure_pt("cup"), Some("xícara"));
        assert_eq!(common_measure_pt("tbsp"), Some("colher de sopa"));
        assert_eq!(common_measure_pt("g"), Some("g"));
        assert_eq!(common_measure_pt("hogshead"), None);
    }

    #[tokio::test]
    async fn missing_api_key_passes_text_through() {
        let state = offline_state();
        assert_eq!(translate(&state, "arroz com feijão", "PT", "EN").await, "arroz com feijão");
        assert_eq!(translate(&state, "", "PT", "EN").await, "");
    }

    #[tokio::test]
    async fn dictionary_hits_need_no_api_key() {
        let state = offline_state();
        assert_eq!(translate(&state, "cup", "EN", "PT").await, "xícara");
        assert_eq!(translate(&state, "scoop", "EN", "PT").await, "concha");
    }
}
