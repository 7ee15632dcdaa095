//! Result types produced by a finished attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{display_percent, score_percent};

/// The immutable outcome of a finished quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Quiz this attempt answered.
    pub quiz_id: String,
    /// Unique id of this attempt.
    pub attempt_id: Uuid,
    /// Number of questions answered correctly.
    pub correct: usize,
    /// Number of questions in the quiz.
    pub total: usize,
    /// `correct / total * 100`, unrounded.
    pub percent: f64,
    /// Chosen option index per question, in question order.
    pub answers: Vec<usize>,
    pub completed_at: DateTime<Utc>,
}

impl QuizResult {
    pub(crate) fn new(quiz_id: &str, correct: usize, answers: Vec<usize>) -> Self {
        let total = answers.len();
        Self {
            quiz_id: quiz_id.to_string(),
            attempt_id: Uuid::new_v4(),
            correct,
            total,
            percent: score_percent(correct, total),
            answers,
            completed_at: Utc::now(),
        }
    }

    /// Percentage rounded to the nearest whole number, for display.
    pub fn rounded_percent(&self) -> u32 {
        display_percent(self.percent)
    }

    /// Build the request handed to the completion sink.
    pub fn to_completion(&self, user_id: &str) -> CompletionRecord {
        CompletionRecord {
            user_id: user_id.to_string(),
            quiz_id: self.quiz_id.clone(),
            score: self.percent,
            answers: self.answers.clone(),
            completed_at: Some(self.completed_at),
        }
    }
}

/// A completed attempt as persisted by the store (`quiz_responses` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub user_id: String,
    pub quiz_id: String,
    /// Unrounded percentage in `0.0..=100.0`.
    pub score: f64,
    pub answers: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "created_at")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_percent_and_rounding() {
        let result = QuizResult::new("q", 2, vec![1, 0, 2]);
        assert_eq!(result.total, 3);
        assert!((result.percent - 66.666_666).abs() < 0.001);
        assert_eq!(result.rounded_percent(), 67);
    }

    #[test]
    fn completion_record_carries_raw_percent() {
        let result = QuizResult::new("q", 1, vec![0, 3, 1]);
        let record = result.to_completion("user-7");
        assert_eq!(record.user_id, "user-7");
        assert_eq!(record.quiz_id, "q");
        assert_eq!(record.answers, vec![0, 3, 1]);
        assert!((record.score - 33.333_333).abs() < 0.001);
    }

    #[test]
    fn completion_record_wire_shape() {
        let record = CompletionRecord {
            user_id: "u".into(),
            quiz_id: "q".into(),
            score: 50.0,
            answers: vec![1, 0],
            completed_at: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"user_id": "u", "quiz_id": "q", "score": 50.0, "answers": [1, 0]})
        );
    }
}
