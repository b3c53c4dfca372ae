// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'questions' table in the database.
///
/// Carries the correct answer and explanation, so it must never be
/// serialized to a client before the quiz is submitted.
#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: i64,
    pub topic_id: i64,

    /// The prompt text.
    pub question: String,

    /// Ordered answer options, stored as a JSON array.
    pub options: Json<Vec<String>>,

    /// 0-based index into `options`.
    pub correct_answer: i32,

    pub difficulty: String,

    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, selected_answer: i32) -> bool {
        selected_answer == self.correct_answer
    }
}

/// Client-safe projection of a question (no correct answer, no explanation).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QuestionForQuiz {
    pub id: i64,
    pub question: String,
    pub options: Json<Vec<String>>,
    pub difficulty: String,
}

impl From<Question> for QuestionForQuiz {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question: q.question,
            options: q.options,
            difficulty: q.difficulty,
        }
    }
}

/// Difficulty tier used to filter questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}
