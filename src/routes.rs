// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, quiz, topic},
    state::AppState,
    utils::jwt::auth_middleware,
};

async fn health_check() -> impl IntoResponse {
    Json(json!({ "success": true, "status": "ok" }))
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, topics, quiz).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(auth_layer.clone()),
        );

    let topic_routes = Router::new()
        .route("/", get(topic::list_topics))
        .route("/{slug}", get(topic::get_topic));

    let quiz_routes = Router::new()
        .route("/start/{slug}", get(quiz::start_quiz))
        .route("/leaderboard", get(quiz::get_leaderboard))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/submit", post(quiz::submit_quiz))
                .route("/history", get(quiz::get_history))
                .route("/stats", get(quiz::get_stats))
                .route_layer(auth_layer),
        );

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/topics", topic_routes)
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
