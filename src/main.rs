mod api;
mod assets;
mod config;
mod generator;
mod openapi;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub struct AppState {
    pub config: config::CardConfig,
    pub background: image::RgbaImage,
    pub fonts: generator::FontSet,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("BACKEND_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let config = config::CardConfig::load().expect("failed to load card config");

    // One-time asset wait: background and fonts must be ready before the
    // first render, so no export ever uses a placeholder.
    let http = reqwest::Client::new();
    let background = assets::load_background(&http, &config)
        .await
        .expect("failed to load card background");
    let fonts = generator::FontSet::load(&config).expect("failed to load fonts");

    let state = AppState { config, background, fonts };

    let openapi = openapi::ApiDoc::openapi();

    let app = Router::new()
        // Swagger UI + OpenAPI schema
        .merge(
            SwaggerUi::new("/docs")
                .url("/openapi.json", openapi)
        )

        // API
        .route("/health", get(api::health))
        .route("/layout", get(api::layout))
        .route("/defaults", get(api::defaults))
        .route("/render", post(api::render))
        .route("/download", post(api::download))
        .with_state(Arc::new(state));

    let addr: SocketAddr = format!("{host}:{port}").parse().expect("bind addr");
    info!("Starting cardgen-backend on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
