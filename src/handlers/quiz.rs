// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    config::{Config, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT},
    error::AppError,
    models::{
        question::Difficulty,
        quiz_attempt::{HistoryParams, LeaderboardParams, QuizSubmission, SubmitQuizRequest},
    },
    repositories::{PgQuizStore, attempts},
    services::quiz_session,
    utils::{
        extract::{ApiJson, ApiQuery},
        jwt::Claims,
    },
};

#[derive(Debug, Deserialize)]
pub struct StartQuizParams {
    pub limit: Option<i64>,
    pub difficulty: Option<Difficulty>,
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT)
}

/// Starts a quiz for a topic.
///
/// Returns a random question set with correct answers and explanations withheld,
/// plus the advisory per-question time budget.
pub async fn start_quiz(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(slug): Path<String>,
    ApiQuery(params): ApiQuery<StartQuizParams>,
) -> Result<impl IntoResponse, AppError> {
    let store = PgQuizStore::new(pool);
    let limit = config.quiz_limit(params.limit);

    let quiz = quiz_session::start_quiz(&store, &slug, limit, params.difficulty).await?;

    Ok(Json(json!({
        "success": true,
        "topic": quiz.topic,
        "questions": quiz.questions,
        "total_questions": quiz.total_questions,
        "time_per_question": quiz.time_per_question,
    })))
}

/// Submits a user's quiz answers and scores them.
///
/// * Validates the token and extracts User ID.
/// * Validates the body into a `QuizSubmission`.
/// * Compares answers with the authoritative question records.
/// * Records the attempt and its answers in one transaction.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let submission = QuizSubmission::try_from(req)?;
    let store = PgQuizStore::new(pool);

    let result = quiz_session::submit_quiz(
        &store,
        user_id,
        submission,
        config.unmatched_question_policy,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Quiz submitted successfully",
        "result": result,
    })))
}

/// Lists the current user's attempts, newest first.
pub async fn get_history(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let history = attempts::list_history(&pool, claims.user_id()?, clamp_limit(params.limit))
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz history: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(json!({
        "success": true,
        "history": history,
    })))
}

/// Aggregate numbers for the current user.
pub async fn get_stats(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let stats = attempts::user_stats(&pool, claims.user_id()?).await?;

    Ok(Json(json!({
        "success": true,
        "total_quizzes": stats.total_quizzes,
        "avg_score": stats.avg_score,
        "total_points": stats.total_points,
        "topics_attempted": stats.topics_attempted,
    })))
}

/// Ranks users by total points, optionally within one topic.
pub async fn get_leaderboard(
    State(pool): State<PgPool>,
    ApiQuery(params): ApiQuery<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let leaderboard = attempts::leaderboard(&pool, params.topic.as_deref(), clamp_limit(params.limit))
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(json!({
        "success": true,
        "leaderboard": leaderboard,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_limits_are_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_HISTORY_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(10_000)), MAX_HISTORY_LIMIT);
    }
}
