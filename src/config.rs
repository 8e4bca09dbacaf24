use std::env;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Fallback signing secret, accepted only when `APP_ENV=development`.
const DEV_SESSION_SECRET: &str = "mealtrack-dev-secret-do-not-use-in-production";

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The deployment environment (`development` or `production`).
    pub app_env: String,
    /// The secret used to sign session tokens.
    pub session_secret: Zeroizing<String>,
    /// The lifetime of a session in hours.
    pub session_ttl_hours: i64,
    /// The minimum accepted password length.
    pub password_min_len: usize,
    /// The TCP port to listen on.
    pub port: u16,
    /// Nutritionix application id, if configured.
    pub nutritionix_app_id: Option<String>,
    /// Nutritionix API key, if configured.
    pub nutritionix_api_key: Option<String>,
    /// DeepL API key, if configured.
    pub deepl_api_key: Option<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if app_env == "development" => {
                tracing::warn!(
                    "SESSION_SECRET not set, using development fallback (never do this in production)"
                );
                DEV_SESSION_SECRET.to_string()
            }
            _ => anyhow::bail!(
                "SESSION_SECRET must be set when APP_ENV is not 'development' \
                 (generate with: openssl rand -hex 32)"
            ),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            app_env,
            session_secret: Zeroizing::new(session_secret),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("Invalid SESSION_TTL_HOURS")?,
            password_min_len: env::var("PASSWORD_MIN_LEN")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .context("Invalid PASSWORD_MIN_LEN")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid PORT")?,
            nutritionix_app_id: env::var("NUTRITIONIX_APP_ID").ok().filter(|v| !v.is_empty()),
            nutritionix_api_key: env::var("NUTRITIONIX_API_KEY").ok().filter(|v| !v.is_empty()),
            deepl_api_key: env::var("DEEPL_API_KEY").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Whether the application is running in production.
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
