// src/repositories/attempts.rs

use sqlx::{PgConnection, PgPool};

use crate::models::quiz_attempt::{
    AttemptHistoryEntry, LeaderboardEntry, NewAttempt, QuizAttempt, UserAnswer, UserStats,
};

/// Postgres' default name for the `quiz_attempts.user_id` foreign key.
pub const ATTEMPT_OWNER_FK: &str = "quiz_attempts_user_id_fkey";

pub async fn record_attempt(
    conn: &mut PgConnection,
    user_id: i64,
    topic_id: i64,
    score: i32,
    total_questions: i32,
    percentage: f64,
    time_taken: i32,
) -> Result<QuizAttempt, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(
        r#"
        INSERT INTO quiz_attempts (user_id, topic_id, score, total_questions, percentage, time_taken)
        VALUES ($1, $2, $3, $4, CAST($5 AS NUMERIC(5, 2)), $6)
        RETURNING
            id, user_id, topic_id, score, total_questions,
            percentage::FLOAT8 AS percentage, time_taken, completed_at
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .bind(score)
    .bind(total_questions)
    .bind(percentage)
    .bind(time_taken)
    .fetch_one(conn)
    .await
}

/// No existence check on `question_id`; the foreign key rejects unknown questions.
pub async fn record_answer(
    conn: &mut PgConnection,
    attempt_id: i64,
    question_id: i64,
    selected_answer: i32,
    is_correct: bool,
    time_taken: i32,
) -> Result<UserAnswer, sqlx::Error> {
    sqlx::query_as::<_, UserAnswer>(
        r#"
        INSERT INTO user_answers (attempt_id, question_id, selected_answer, is_correct, time_taken)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, attempt_id, question_id, selected_answer, is_correct, time_taken
        "#,
    )
    .bind(attempt_id)
    .bind(question_id)
    .bind(selected_answer)
    .bind(is_correct)
    .bind(time_taken)
    .fetch_one(conn)
    .await
}

/// Writes the attempt and all of its answers in one transaction.
pub async fn save_attempt(pool: &PgPool, new: &NewAttempt) -> Result<QuizAttempt, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let attempt = record_attempt(
        &mut *tx,
        new.user_id,
        new.topic_id,
        new.score,
        new.total_questions,
        new.percentage,
        new.time_taken,
    )
    .await?;

    for answer in &new.answers {
        record_answer(
            &mut *tx,
            attempt.id,
            answer.question_id,
            answer.selected_answer,
            answer.is_correct,
            answer.time_taken,
        )
        .await?;
    }

    tx.commit().await?;
    Ok(attempt)
}

pub async fn list_history(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<AttemptHistoryEntry>, sqlx::Error> {
    sqlx::query_as::<_, AttemptHistoryEntry>(
        r#"
        SELECT
            a.id, a.score, a.total_questions, a.percentage::FLOAT8 AS percentage,
            a.time_taken, a.completed_at,
            t.name AS topic_name, t.slug AS topic_slug, t.icon AS topic_icon
        FROM quiz_attempts a
        JOIN topics t ON t.id = a.topic_id
        WHERE a.user_id = $1
        ORDER BY a.completed_at DESC, a.id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn user_stats(pool: &PgPool, user_id: i64) -> Result<UserStats, sqlx::Error> {
    sqlx::query_as::<_, UserStats>(
        r#"
        SELECT
            COUNT(*) AS total_quizzes,
            COALESCE(ROUND(AVG(percentage), 2), 0)::FLOAT8 AS avg_score,
            COALESCE(SUM(score), 0)::BIGINT AS total_points,
            COUNT(DISTINCT topic_id) AS topics_attempted
        FROM quiz_attempts
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn leaderboard(
    pool: &PgPool,
    topic_slug: Option<&str>,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT
            u.username,
            COUNT(a.id) AS total_quizzes,
            COALESCE(SUM(a.score), 0)::BIGINT AS total_points,
            ROUND(AVG(a.percentage), 2)::FLOAT8 AS avg_score
        FROM quiz_attempts a
        JOIN users u ON u.id = a.user_id
        JOIN topics t ON t.id = a.topic_id
        WHERE $1::TEXT IS NULL OR t.slug = $1
        GROUP BY u.id, u.username
        ORDER BY total_points DESC, avg_score DESC, u.username
        LIMIT $2
        "#,
    )
    .bind(topic_slug)
    .bind(limit)
    .fetch_all(pool)
    .await
}
