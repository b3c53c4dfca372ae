// src/repositories/mod.rs

pub mod attempts;
pub mod questions;
pub mod topics;
pub mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        question::{Difficulty, Question, QuestionForQuiz},
        quiz_attempt::{NewAttempt, QuizAttempt},
        topic::Topic,
    },
};

/// Storage operations the quiz session needs.
///
/// `PgQuizStore` is the production implementation; tests substitute an in-memory one.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_active_topic(&self, slug: &str) -> Result<Option<Topic>, AppError>;

    async fn fetch_quiz_questions(
        &self,
        topic_id: i64,
        limit: i64,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<QuestionForQuiz>, AppError>;

    async fn fetch_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, AppError>;

    /// Persists the attempt together with its answers, all or nothing.
    async fn save_attempt(&self, attempt: &NewAttempt) -> Result<QuizAttempt, AppError>;
}

/// `QuizStore` backed by the shared Postgres pool.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn find_active_topic(&self, slug: &str) -> Result<Option<Topic>, AppError> {
        Ok(topics::find_active_by_slug(&self.pool, slug).await?)
    }

    async fn fetch_quiz_questions(
        &self,
        topic_id: i64,
        limit: i64,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<QuestionForQuiz>, AppError> {
        questions::fetch_quiz_questions(&self.pool, topic_id, limit, difficulty)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch quiz questions: {:?}", e);
                AppError::from(e)
            })
    }

    async fn fetch_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, AppError> {
        questions::fetch_questions_by_ids(&self.pool, ids)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch answer keys: {:?}", e);
                AppError::from(e)
            })
    }

    async fn save_attempt(&self, attempt: &NewAttempt) -> Result<QuizAttempt, AppError> {
        attempts::save_attempt(&self.pool, attempt).await.map_err(|e| {
            if is_missing_owner(&e) {
                tracing::warn!(user_id = attempt.user_id, "Attempt submitted for a deleted user");
                AppError::AuthError("User no longer exists".to_string())
            } else {
                tracing::error!("Failed to save quiz attempt: {:?}", e);
                AppError::from(e)
            }
        })
    }
}

/// The token was valid but its user row is gone.
fn is_missing_owner(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation()
                && db_err.constraint() == Some(attempts::ATTEMPT_OWNER_FK)
    )
}
