// src/models/quiz_attempt.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::{error::AppError, models::topic::SLUG_REGEX};

/// Represents the 'quiz_attempts' table in the database.
/// One row per submission, never updated afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub topic_id: i64,

    /// Number of correct answers.
    pub score: i32,
    pub total_questions: i32,

    /// `score / total_questions * 100`, rounded to 2 decimals.
    pub percentage: f64,

    /// Total time the client reported, in seconds.
    pub time_taken: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'user_answers' table. Owned by a `QuizAttempt`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_answer: i32,
    pub is_correct: bool,
    pub time_taken: i32,
}

/// Everything needed to persist one scored submission.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub topic_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub time_taken: i32,
    pub answers: Vec<NewUserAnswer>,
}

#[derive(Debug, Clone)]
pub struct NewUserAnswer {
    pub question_id: i64,
    pub selected_answer: i32,
    pub is_correct: bool,
    pub time_taken: i32,
}

/// One answer as sent by the client.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmittedAnswer {
    #[validate(range(min = 1, message = "question_id must be a positive id"))]
    pub question_id: i64,

    /// Selected option index; `-1` means the question was left unanswered.
    #[validate(range(min = -1, message = "selected_answer must be -1 or a valid option index"))]
    pub selected_answer: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "time_taken cannot be negative"))]
    pub time_taken: i32,
}

/// Raw body of `POST /quiz/submit`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[validate(
        length(min = 1, max = 100, message = "topic_slug is required"),
        regex(path = *SLUG_REGEX, message = "topic_slug is not a valid slug")
    )]
    pub topic_slug: String,

    #[validate(
        length(min = 1, max = 100, message = "answers must contain between 1 and 100 entries"),
        custom(function = validate_unique_questions),
        nested
    )]
    pub answers: Vec<SubmittedAnswer>,

    #[serde(default)]
    #[validate(range(min = 0, message = "total_time cannot be negative"))]
    pub total_time: i32,
}

/// Rejects submissions that answer the same question more than once.
fn validate_unique_questions(answers: &[SubmittedAnswer]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(answers.len());
    if answers.iter().all(|a| seen.insert(a.question_id)) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_question_id")
            .with_message("each question may be answered only once".into()))
    }
}

/// A submission that passed validation. Only this type reaches the scoring engine.
#[derive(Debug, Clone)]
pub struct QuizSubmission {
    pub topic_slug: String,
    pub answers: Vec<SubmittedAnswer>,
    pub total_time: i32,
}

impl QuizSubmission {
    pub fn question_ids(&self) -> Vec<i64> {
        self.answers.iter().map(|a| a.question_id).collect()
    }
}

impl TryFrom<SubmitQuizRequest> for QuizSubmission {
    type Error = AppError;

    fn try_from(req: SubmitQuizRequest) -> Result<Self, Self::Error> {
        req.validate()?;

        Ok(Self {
            topic_slug: req.topic_slug,
            answers: req.answers,
            total_time: req.total_time,
        })
    }
}

/// Attempt joined with its topic, as listed in the history view.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptHistoryEntry {
    pub id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub time_taken: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub topic_name: String,
    pub topic_slug: String,
    pub topic_icon: Option<String>,
}

/// Aggregate numbers for one user. All zero when the user has no attempts.
#[derive(Debug, Default, Serialize, FromRow)]
pub struct UserStats {
    pub total_quizzes: i64,
    pub avg_score: f64,
    pub total_points: i64,
    pub topics_attempted: i64,
}

/// Aggregated struct for displaying the leaderboard.
/// Represents a row grouped from `users` and `quiz_attempts`.
#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub total_quizzes: i64,
    pub total_points: i64,
    pub avg_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
    /// Restrict the ranking to one topic slug.
    pub topic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> Result<QuizSubmission, AppError> {
        let req: SubmitQuizRequest = serde_json::from_value(body)?;
        QuizSubmission::try_from(req)
    }

    #[test]
    fn accepts_well_formed_submission() {
        let submission = parse(json!({
            "topic_slug": "javascript",
            "answers": [
                { "question_id": 1, "selected_answer": 2, "time_taken": 12 },
                { "question_id": 2, "selected_answer": -1, "time_taken": 30 }
            ],
            "total_time": 42
        }))
        .unwrap();

        assert_eq!(submission.topic_slug, "javascript");
        assert_eq!(submission.question_ids(), vec![1, 2]);
        assert_eq!(submission.total_time, 42);
    }

    #[test]
    fn total_time_defaults_to_zero() {
        let submission = parse(json!({
            "topic_slug": "python",
            "answers": [{ "question_id": 5, "selected_answer": 0 }]
        }))
        .unwrap();

        assert_eq!(submission.total_time, 0);
        assert_eq!(submission.answers[0].time_taken, 0);
    }

    #[test]
    fn rejects_empty_answers() {
        let err = parse(json!({ "topic_slug": "javascript", "answers": [], "total_time": 0 }))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_oversized_submission() {
        let answers: Vec<_> = (1..=101)
            .map(|id| json!({ "question_id": id, "selected_answer": 0, "time_taken": 1 }))
            .collect();

        let err = parse(json!({ "topic_slug": "javascript", "answers": answers })).unwrap_err();

        match err {
            AppError::Validation(errors) => {
                let field = errors.field_errors()["answers"];
                assert_eq!(field[0].code, "length");
                // The offending list is echoed back in the error params.
                assert!(field[0].params.contains_key("value"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let err = parse(json!({
            "topic_slug": "javascript",
            "answers": [
                { "question_id": 3, "selected_answer": 1, "time_taken": 5 },
                { "question_id": 3, "selected_answer": 1, "time_taken": 5 }
            ]
        }))
        .unwrap_err();

        match err {
            AppError::Validation(errors) => assert!(errors.field_errors().contains_key("answers")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_slug_and_negative_times() {
        assert!(parse(json!({
            "topic_slug": "Not A Slug",
            "answers": [{ "question_id": 1, "selected_answer": 0 }]
        }))
        .is_err());

        assert!(parse(json!({
            "topic_slug": "javascript",
            "answers": [{ "question_id": 1, "selected_answer": 0, "time_taken": -3 }]
        }))
        .is_err());

        assert!(parse(json!({
            "topic_slug": "javascript",
            "answers": [{ "question_id": 1, "selected_answer": -2 }]
        }))
        .is_err());

        assert!(parse(json!({
            "topic_slug": "javascript",
            "answers": [{ "question_id": 1, "selected_answer": 0 }],
            "total_time": -1
        }))
        .is_err());
    }

    #[test]
    fn missing_fields_fail_to_deserialize() {
        let err = parse(json!({ "answers": [] })).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
