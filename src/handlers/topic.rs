// src/handlers/topic.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{error::AppError, models::topic::is_valid_slug, repositories::topics};

/// Lists active topics with the size of their question pools.
pub async fn list_topics(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let topics = topics::list_active(&pool).await.map_err(|e| {
        tracing::error!("Failed to list topics: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({
        "success": true,
        "topics": topics,
    })))
}

pub async fn get_topic(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("Topic '{slug}' not found"));

    if !is_valid_slug(&slug) {
        return Err(not_found());
    }

    let topic = topics::find_listing_by_slug(&pool, &slug)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(json!({
        "success": true,
        "topic": topic,
    })))
}
