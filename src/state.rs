use deadpool_postgres::Pool;
use crate::config::Config;
use crate::error::Result;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The shared HTTP client for upstream (Nutritionix/DeepL) calls.
    pub http: reqwest::Client,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("PostgreSQL pool initialized");

        crate::db::init_schema(&db).await?;
        tracing::info!("Database schema ready");

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| crate::error::AppError::Internal(format!("HTTP client: {}", e)))?;

        Ok(AppState {
            db,
            http,
            config: config.clone(),
        })
    }
}
