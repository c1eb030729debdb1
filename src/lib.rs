pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use crate::config::AppConfig;
use crate::services::compressor::Compressor;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub compressor: Arc<dyn Compressor>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index::index_page))
        .route(
            "/upload",
            post(handlers::optimize::optimize_image)
                .options(handlers::optimize::preflight)
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
