// src/repositories/questions.rs

use sqlx::PgPool;

use crate::models::question::{Difficulty, Question, QuestionForQuiz};

/// Draws up to `limit` questions of a topic in a fresh random order.
///
/// Only the client-safe columns are selected; correct answers never leave the database here.
pub async fn fetch_quiz_questions(
    pool: &PgPool,
    topic_id: i64,
    limit: i64,
    difficulty: Option<Difficulty>,
) -> Result<Vec<QuestionForQuiz>, sqlx::Error> {
    sqlx::query_as::<_, QuestionForQuiz>(
        r#"
        SELECT id, question, options, difficulty
        FROM questions
        WHERE topic_id = $1
          AND ($2::TEXT IS NULL OR difficulty = $2)
        ORDER BY RANDOM()
        LIMIT $3
        "#,
    )
    .bind(topic_id)
    .bind(difficulty.map(|d| d.as_str()))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Authoritative lookup used when scoring. Ids with no row are simply absent from the result.
pub async fn fetch_questions_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<Question>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, topic_id, question, options, correct_answer, difficulty, explanation
        FROM questions
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}
