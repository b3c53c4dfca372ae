// src/services/scoring.rs

//! Pure scoring of a quiz submission against the authoritative question records.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::Serialize;

use crate::models::{question::Question, quiz_attempt::SubmittedAnswer};

/// What to do with submitted answers whose question id has no authoritative record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedQuestionPolicy {
    /// Ignore the answer but keep it in the denominator.
    #[default]
    Skip,
    /// Ignore the answer and drop it from the denominator.
    Exclude,
    /// Fail the whole submission.
    Reject,
}

impl FromStr for UnmatchedQuestionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "exclude" => Ok(Self::Exclude),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown unmatched question policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// No answers were submitted.
    EmptySubmission,
    /// Every answer was unmatched and the policy removed them from the denominator.
    NothingScorable,
    /// Unmatched ids under `UnmatchedQuestionPolicy::Reject`.
    UnknownQuestions(Vec<i64>),
}

impl fmt::Display for ScoringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringError::EmptySubmission => write!(f, "No answers submitted"),
            ScoringError::NothingScorable => {
                write!(f, "None of the submitted answers belong to this quiz")
            }
            ScoringError::UnknownQuestions(ids) => {
                write!(f, "Unknown question ids in submission: {ids:?}")
            }
        }
    }
}

impl std::error::Error for ScoringError {}

/// Letter grade. Bands are inclusive on their lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => Grade::APlus,
            p if p >= 80.0 => Grade::A,
            p if p >= 70.0 => Grade::BPlus,
            p if p >= 60.0 => Grade::B,
            p if p >= 50.0 => Grade::C,
            p if p >= 40.0 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn feedback(&self) -> &'static str {
        match self {
            Grade::APlus => "Outstanding! You have mastered this topic.",
            Grade::A => "Excellent work! You have a strong grasp of the material.",
            Grade::BPlus => "Great job! Review the questions you missed to sharpen your knowledge.",
            Grade::B => "Good effort! Focus on your weak areas to improve further.",
            Grade::C => "Fair performance. More practice will help you master this topic.",
            Grade::D => "You're getting there. Review the basics and try again.",
            Grade::F => "Keep practicing! Revisit the fundamentals and try again.",
        }
    }
}

/// Per-answer breakdown returned after submission.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerDetail {
    pub question_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub selected_answer: i32,
    pub correct_answer: i32,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub difficulty: String,
    pub time_taken: i32,
}

/// Per-topic block. A quiz covers one topic, so it mirrors the attempt summary.
#[derive(Debug, Clone, Serialize)]
pub struct TopicAnalysis {
    pub topic: String,
    pub correct: i32,
    pub total: i32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub grade: Grade,
    pub feedback: &'static str,
    pub answers: Vec<AnswerDetail>,
    pub topic_analysis: TopicAnalysis,
}

/// Rounds to 2 decimal places, ties away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `correct / total * 100` rounded to 2 decimals. `total` must be positive.
pub fn percentage(correct: i32, total: i32) -> f64 {
    // Multiplying first keeps exact band boundaries (e.g. 4/10 -> 40.0) exact.
    round2(f64::from(correct) * 100.0 / f64::from(total))
}

/// Scores `answers` against `questions`.
///
/// * Correctness is exact equality of the selected index with `correct_answer`.
/// * Answers without a matching question are handled according to `policy`.
/// * Details are returned in submission order, one per matched answer.
pub fn score(
    answers: &[SubmittedAnswer],
    questions: &[Question],
    topic_name: &str,
    policy: UnmatchedQuestionPolicy,
) -> Result<ScoreResult, ScoringError> {
    if answers.is_empty() {
        return Err(ScoringError::EmptySubmission);
    }

    let lookup: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();

    let mut details = Vec::with_capacity(answers.len());
    let mut unmatched = Vec::new();
    let mut correct_count = 0;

    for answer in answers {
        let Some(question) = lookup.get(&answer.question_id) else {
            unmatched.push(answer.question_id);
            continue;
        };

        let is_correct = question.is_correct(answer.selected_answer);
        if is_correct {
            correct_count += 1;
        }

        details.push(AnswerDetail {
            question_id: question.id,
            question: question.question.clone(),
            options: question.options.0.clone(),
            selected_answer: answer.selected_answer,
            correct_answer: question.correct_answer,
            is_correct,
            explanation: question.explanation.clone(),
            difficulty: question.difficulty.clone(),
            time_taken: answer.time_taken,
        });
    }

    if !unmatched.is_empty() {
        tracing::warn!(?unmatched, ?policy, "Submission references unknown questions");
    }

    let total_questions = match policy {
        UnmatchedQuestionPolicy::Skip => answers.len() as i32,
        UnmatchedQuestionPolicy::Exclude => details.len() as i32,
        UnmatchedQuestionPolicy::Reject if !unmatched.is_empty() => {
            return Err(ScoringError::UnknownQuestions(unmatched));
        }
        UnmatchedQuestionPolicy::Reject => answers.len() as i32,
    };

    if total_questions == 0 {
        return Err(ScoringError::NothingScorable);
    }

    let percentage = percentage(correct_count, total_questions);
    let grade = Grade::from_percentage(percentage);

    Ok(ScoreResult {
        score: correct_count,
        total_questions,
        percentage,
        grade,
        feedback: grade.feedback(),
        answers: details,
        topic_analysis: TopicAnalysis {
            topic: topic_name.to_string(),
            correct: correct_count,
            total: total_questions,
            percentage,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn question(id: i64, correct_answer: i32) -> Question {
        Question {
            id,
            topic_id: 1,
            question: format!("Question {id}"),
            options: Json(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
            correct_answer,
            difficulty: "medium".to_string(),
            explanation: Some(format!("Because of {id}")),
        }
    }

    fn answer(question_id: i64, selected_answer: i32) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_answer,
            time_taken: 10,
        }
    }

    #[test]
    fn all_correct_is_a_plus() {
        let questions: Vec<_> = (1..=10).map(|id| question(id, (id % 4) as i32)).collect();
        let answers: Vec<_> = questions.iter().map(|q| answer(q.id, q.correct_answer)).collect();

        let result = score(&answers, &questions, "JavaScript", UnmatchedQuestionPolicy::Skip).unwrap();

        assert_eq!(result.score, 10);
        assert_eq!(result.total_questions, 10);
        assert_eq!(result.percentage, 100.0);
        assert_eq!(result.grade, Grade::APlus);
        assert_eq!(result.feedback, Grade::APlus.feedback());
        assert!(result.answers.iter().all(|d| d.is_correct));
        assert_eq!(result.topic_analysis.topic, "JavaScript");
        assert_eq!(result.topic_analysis.correct, 10);
        assert_eq!(result.topic_analysis.percentage, 100.0);
    }

    #[test]
    fn partial_score_rounds_to_two_decimals() {
        let questions = vec![question(1, 0), question(2, 1), question(3, 2)];
        let answers = vec![answer(1, 0), answer(2, 1), answer(3, 0)];

        let result = score(&answers, &questions, "Python", UnmatchedQuestionPolicy::Skip).unwrap();

        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 66.67);
        assert_eq!(result.grade, Grade::B);

        let wrong = &result.answers[2];
        assert!(!wrong.is_correct);
        assert_eq!(wrong.selected_answer, 0);
        assert_eq!(wrong.correct_answer, 2);
        assert_eq!(wrong.explanation.as_deref(), Some("Because of 3"));
    }

    #[test]
    fn unanswered_counts_as_wrong() {
        let questions = vec![question(1, 0)];
        let result = score(&[answer(1, -1)], &questions, "t", UnmatchedQuestionPolicy::Skip).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, Grade::F);
    }

    #[test]
    fn empty_submission_is_rejected() {
        let err = score(&[], &[question(1, 0)], "t", UnmatchedQuestionPolicy::Skip).unwrap_err();
        assert_eq!(err, ScoringError::EmptySubmission);
    }

    #[test]
    fn skip_policy_keeps_unmatched_in_denominator() {
        let questions = vec![question(1, 0), question(2, 0)];
        let answers = vec![answer(1, 0), answer(2, 0), answer(999, 0)];

        let result = score(&answers, &questions, "t", UnmatchedQuestionPolicy::Skip).unwrap();

        assert_eq!(result.score, 2);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.percentage, 66.67);
        assert_eq!(result.answers.len(), 2);
        assert!(result.answers.iter().all(|d| d.question_id != 999));
    }

    #[test]
    fn exclude_policy_drops_unmatched_from_denominator() {
        let questions = vec![question(1, 0), question(2, 0)];
        let answers = vec![answer(1, 0), answer(2, 0), answer(999, 0)];

        let result = score(&answers, &questions, "t", UnmatchedQuestionPolicy::Exclude).unwrap();

        assert_eq!(result.score, 2);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn exclude_policy_with_nothing_matched_fails() {
        let err = score(&[answer(5, 0)], &[], "t", UnmatchedQuestionPolicy::Exclude).unwrap_err();
        assert_eq!(err, ScoringError::NothingScorable);
    }

    #[test]
    fn reject_policy_names_unknown_ids() {
        let questions = vec![question(1, 0)];
        let answers = vec![answer(1, 0), answer(42, 1), answer(43, 1)];

        let err = score(&answers, &questions, "t", UnmatchedQuestionPolicy::Reject).unwrap_err();
        assert_eq!(err, ScoringError::UnknownQuestions(vec![42, 43]));

        let ok = score(&answers[..1], &questions, "t", UnmatchedQuestionPolicy::Reject).unwrap();
        assert_eq!(ok.score, 1);
    }

    #[test]
    fn score_never_exceeds_total() {
        let questions: Vec<_> = (1..=6).map(|id| question(id, 1)).collect();
        for policy in [UnmatchedQuestionPolicy::Skip, UnmatchedQuestionPolicy::Exclude] {
            for matched in 1..=6 {
                let mut answers: Vec<_> = (1..=matched).map(|id| answer(id, 1)).collect();
                answers.push(answer(100 + matched, 1));

                let result = score(&answers, &questions, "t", policy).unwrap();
                assert!(result.score >= 0);
                assert!(result.score <= result.total_questions);
                assert_eq!(
                    result.percentage,
                    round2(100.0 * f64::from(result.score) / f64::from(result.total_questions))
                );
            }
        }
    }

    #[test]
    fn grade_band_boundaries_belong_to_higher_band() {
        let cases = [
            (100.0, Grade::APlus),
            (90.0, Grade::APlus),
            (89.99, Grade::A),
            (80.0, Grade::A),
            (79.99, Grade::BPlus),
            (70.0, Grade::BPlus),
            (60.0, Grade::B),
            (59.99, Grade::C),
            (50.0, Grade::C),
            (40.0, Grade::D),
            (39.99, Grade::F),
            (0.0, Grade::F),
        ];
        for (p, expected) in cases {
            assert_eq!(Grade::from_percentage(p), expected, "percentage {p}");
        }
    }

    #[test]
    fn exact_boundaries_from_counts() {
        for (correct, expected) in [(4, Grade::D), (5, Grade::C), (6, Grade::B), (7, Grade::BPlus), (8, Grade::A), (9, Grade::APlus)] {
            let p = percentage(correct, 10);
            assert_eq!(p, f64::from(correct * 10));
            assert_eq!(Grade::from_percentage(p), expected);
        }
    }

    #[test]
    fn grades_serialize_as_letters() {
        assert_eq!(serde_json::to_value(Grade::APlus).unwrap(), "A+");
        assert_eq!(serde_json::to_value(Grade::BPlus).unwrap(), "B+");
        assert_eq!(Grade::F.as_str(), "F");
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Skip".parse::<UnmatchedQuestionPolicy>(), Ok(UnmatchedQuestionPolicy::Skip));
        assert_eq!("EXCLUDE".parse::<UnmatchedQuestionPolicy>(), Ok(UnmatchedQuestionPolicy::Exclude));
        assert_eq!("reject".parse::<UnmatchedQuestionPolicy>(), Ok(UnmatchedQuestionPolicy::Reject));
        assert!("ignore".parse::<UnmatchedQuestionPolicy>().is_err());
    }
}
