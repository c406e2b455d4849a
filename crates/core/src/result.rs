//! Simulation Result Model
//!
//! A `SimulationResult` is produced exactly once per playback session and is
//! never mutated afterwards. `StoredResult` is the persisted record shape;
//! its field names are part of the stored-data contract and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One graded learner answer, logged per nurse prompt that was submitted.
///
/// The serialized field names (`question`, `studentAnswer`, ...) match the
/// persisted record shape external consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResponseRecord {
    /// The keyword spec the answer was graded against.
    #[serde(rename = "question")]
    pub expected: String,
    #[serde(rename = "studentAnswer")]
    pub student_answer: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    pub rationale: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

/// The outcome of one playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Integer percentage 0..=100.
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    /// The subsequence of response records graded incorrect.
    pub mistakes: Vec<ResponseRecord>,
    /// Seconds left on the countdown at completion; 0 when untimed.
    pub time_remaining: u32,
    pub has_timer: bool,
}

/// Rounds `correct / total` to an integer percentage, with the fixed policy
/// that an empty script scores 0%.
pub fn score_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Coarse outcome band derived from the percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Failed,
    Passed,
    NeedsImprovement,
}

impl ResultStatus {
    pub fn from_score(score: u32) -> Self {
        if score == 0 {
            ResultStatus::Failed
        } else if score >= 60 {
            ResultStatus::Passed
        } else {
            ResultStatus::NeedsImprovement
        }
    }
}

/// The persisted result record.
///
/// `status` and `is_passing` disagree on purpose: a 1% score is
/// NEEDS_IMPROVEMENT yet passing. Both fields are kept verbatim because
/// external consumers may depend on either; do not unify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredResult {
    pub scenario_id: String,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub mistakes: Vec<ResponseRecord>,
    pub status: ResultStatus,
    pub is_passing: bool,
    pub completed_at: DateTime<Utc>,
}

impl StoredResult {
    /// Stamps a session result into its persisted form.
    pub fn new(scenario_id: &str, result: &SimulationResult) -> Self {
        Self {
            scenario_id: scenario_id.to_string(),
            score: result.score,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            mistakes: result.mistakes.clone(),
            status: ResultStatus::from_score(result.score),
            is_passing: result.score > 0,
            completed_at: Utc::now(),
        }
    }
}
