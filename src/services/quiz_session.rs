// src/services/quiz_session.rs

//! Quiz session flow: issuing a question set and scoring a submission.
//!
//! Nothing is kept between the two calls; a submission is reconciled only
//! against the authoritative question records in the store.

use serde::Serialize;

use crate::{
    config::TIME_PER_QUESTION_SECS,
    error::AppError,
    models::{
        question::{Difficulty, QuestionForQuiz},
        quiz_attempt::{NewAttempt, NewUserAnswer, QuizSubmission},
        topic::{TopicSummary, is_valid_slug},
    },
    repositories::QuizStore,
    services::scoring::{self, ScoreResult, UnmatchedQuestionPolicy},
};

/// Question set handed to the client when a quiz starts.
#[derive(Debug, Serialize)]
pub struct QuizStart {
    pub topic: TopicSummary,
    pub questions: Vec<QuestionForQuiz>,
    pub total_questions: usize,
    /// Advisory only.
    pub time_per_question: u32,
}

/// Scored and persisted submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub attempt_id: i64,
    pub time_taken: i32,
    #[serde(flatten)]
    pub score: ScoreResult,
}

fn topic_not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("Topic '{slug}' not found"))
}

/// Resolves the topic and draws a random question set without answers.
pub async fn start_quiz<S: QuizStore + ?Sized>(
    store: &S,
    slug: &str,
    limit: i64,
    difficulty: Option<Difficulty>,
) -> Result<QuizStart, AppError> {
    if !is_valid_slug(slug) {
        return Err(topic_not_found(slug));
    }

    let topic = store
        .find_active_topic(slug)
        .await?
        .ok_or_else(|| topic_not_found(slug))?;

    let questions = store
        .fetch_quiz_questions(topic.id, limit, difficulty)
        .await?;

    if questions.is_empty() {
        return Err(AppError::NotFound(format!(
            "No questions available for topic '{}'",
            topic.slug
        )));
    }

    tracing::debug!(topic = %topic.slug, count = questions.len(), "Issued quiz questions");

    Ok(QuizStart {
        topic: TopicSummary::from(&topic),
        total_questions: questions.len(),
        questions,
        time_per_question: TIME_PER_QUESTION_SECS,
    })
}

/// Scores a validated submission and records it as a new attempt.
///
/// Questions that exist but belong to another topic are treated like unknown ids.
pub async fn submit_quiz<S: QuizStore + ?Sized>(
    store: &S,
    user_id: i64,
    submission: QuizSubmission,
    policy: UnmatchedQuestionPolicy,
) -> Result<SubmissionResult, AppError> {
    let topic = store
        .find_active_topic(&submission.topic_slug)
        .await?
        .ok_or_else(|| topic_not_found(&submission.topic_slug))?;

    let questions: Vec<_> = store
        .fetch_questions_by_ids(&submission.question_ids())
        .await?
        .into_iter()
        .filter(|q| q.topic_id == topic.id)
        .collect();

    let result = scoring::score(&submission.answers, &questions, &topic.name, policy)?;

    let new_attempt = NewAttempt {
        user_id,
        topic_id: topic.id,
        score: result.score,
        total_questions: result.total_questions,
        percentage: result.percentage,
        time_taken: submission.total_time,
        answers: result
            .answers
            .iter()
            .map(|detail| NewUserAnswer {
                question_id: detail.question_id,
                selected_answer: detail.selected_answer,
                is_correct: detail.is_correct,
                time_taken: detail.time_taken,
            })
            .collect(),
    };

    let attempt = store.save_attempt(&new_attempt).await?;

    tracing::info!(
        attempt_id = attempt.id,
        user_id,
        topic = %topic.slug,
        score = result.score,
        total = result.total_questions,
        grade = result.grade.as_str(),
        "Quiz submitted"
    );

    Ok(SubmissionResult {
        attempt_id: attempt.id,
        time_taken: attempt.time_taken,
        score: result,
    })
}
