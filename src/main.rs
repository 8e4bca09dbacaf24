use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use http::{header, Method};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;

mod models {
    pub mod user;
    pub mod session;
    pub mod meal;
}

mod repositories {
    pub mod user;
    pub mod session;
    pub mod meal;
}

mod services {
    pub mod auth;
    pub mod token;
    pub mod nutrition;
    pub mod translation;
}

mod handlers {
    pub mod auth;
    pub mod meals;
    pub mod nutrition;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod auth;
    pub mod meal;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let state = AppState::new(&config).await?;
    tracing::info!("AppState initialized");

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    let public_routes = Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/nutrition/search", post(handlers::nutrition::search))
        .route("/nutrition/nutrients", post(handlers::nutrition::nutrients))
        .route("/nutrition/measure", post(handlers::nutrition::measure))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/meals",
            get(handlers::meals::list_meals).post(handlers::meals::create_meal),
        )
        .route(
            "/meals/{meal_id}",
            get(handlers::meals::get_meal)
                .put(handlers::meals::update_meal)
                .delete(handlers::meals::delete_meal),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors);

    // Hourly sweep of expired session rows, cancelled on graceful shutdown.
    let shutdown = CancellationToken::new();
    let sweep_token = shutdown.clone();
    let sweep_state = state.clone();
    let sweeper = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        interval.tick().await; // first tick fires immediately
        loop {
            tokio::select! {
                _ = sweep_token.cancelled() => {
                    tracing::info!("Session sweeper stopping");
                    break;
                }
                _ = interval.tick() => {
                    match repositories::session::sweep_expired(&sweep_state.db).await {
                        Ok(deleted) if deleted > 0 => {
                            tracing::info!("Swept {} expired sessions", deleted);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!("Session sweep failed: {}", e);
                        }
                    }
                }
            }
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    shutdown.cancel();
    let _ = sweeper.await;

    Ok(())
}
