use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Creates a new database connection pool.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e| AppError::Internal(format!("Invalid DATABASE_URL: {}", e)))?;

    if let Some(host) = pg_config.get_hosts().first() {
        match host {
            tokio_postgres::config::Host::Tcp(hostname) => {
                cfg.host = Some(hostname.to_string());
            }
            tokio_postgres::config::Host::Unix(path) => {
                cfg.host = Some(path.display().to_string());
            }
        }
    }
    if let Some(port) = pg_config.get_ports().first() {
        cfg.port = Some(*port);
    }

    if let Some(dbname) = pg_config.get_dbname() {
        cfg.dbname = Some(dbname.to_string());
    }

    if let Some(user) = pg_config.get_user() {
        cfg.user = Some(user.to_string());
    }

    if let Some(password) = pg_config.get_password() {
        cfg.password = Some(String::from_utf8_lossy(password).to_string());
    }

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.pool = Some(PoolConfig {
        max_size: 16,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(2)),
            recycle: Some(Duration::from_secs(1)),
        },
        queue_mode: Default::default(),
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| AppError::Internal(format!("Failed to create pool: {}", e)))
}

/// Creates the schema if it does not exist yet.
///
/// `servings` and `alt_measures` carry `user_id` redundantly so every read
/// and write on them can be scoped by owner without joining through `meals`.
pub async fn init_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client
        .batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id UUID PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS meals (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                name TEXT NOT NULL,
                original_name TEXT,
                calories INTEGER NOT NULL,
                protein DOUBLE PRECISION NOT NULL,
                carbs DOUBLE PRECISION NOT NULL,
                fat DOUBLE PRECISION NOT NULL,
                meal_type TEXT NOT NULL,
                food_id TEXT,
                image_url TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS servings (
                id BIGSERIAL PRIMARY KEY,
                meal_id BIGINT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                quantity DOUBLE PRECISION NOT NULL,
                unit TEXT NOT NULL,
                original_unit TEXT,
                weight DOUBLE PRECISION NOT NULL
            );

            CREATE TABLE IF NOT EXISTS alt_measures (
                id BIGSERIAL PRIMARY KEY,
                meal_id BIGINT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                serving_weight DOUBLE PRECISION NOT NULL,
                measure TEXT NOT NULL,
                original_measure TEXT,
                seq INTEGER,
                qty DOUBLE PRECISION NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_meals_user_date ON meals (user_id, date);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions (expires_at);
            "#,
        )
        .await?;
    Ok(())
}
