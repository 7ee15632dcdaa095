//! Pure scoring and review functions.
//!
//! Scoring is exact integer equality between the chosen and the correct
//! option index; there is no partial credit.

use std::iter::FusedIterator;

use crate::error::DataIntegrityWarning;
use crate::model::Question;

/// Percentage of correct answers using floating-point division.
///
/// Returns `0.0` for `total == 0`; sessions never reach this because
/// empty quizzes are rejected at start.
pub fn score_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Round a percentage to the nearest whole number for display.
pub fn display_percent(percent: f64) -> u32 {
    percent.round().clamp(0.0, 100.0) as u32
}

/// Count positions where the answer equals the question's correct index.
///
/// Extra answers past the last question are ignored.
pub fn count_correct(questions: &[Question], answers: &[usize]) -> usize {
    questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| q.is_correct(**a))
        .count()
}

/// Mean of a set of stored percentages, or `None` when there are none.
pub fn average_percent(scores: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = scores
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, n), s| (sum + s, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// One reviewed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry<'a> {
    /// Zero-based question position.
    pub position: usize,
    pub prompt: &'a str,
    /// Text of the chosen option; `None` when unanswered or invalid.
    pub chosen: Option<&'a str>,
    /// Text of the correct option; `None` when the definition is broken.
    pub correct: Option<&'a str>,
    pub is_correct: bool,
    /// Set when this entry was degraded because of bad data.
    pub warning: Option<DataIntegrityWarning>,
}

impl ReviewEntry<'_> {
    pub fn is_valid(&self) -> bool {
        self.warning.is_none()
    }
}

/// Lazy review over a quiz and an answer list, one entry per question.
///
/// Clone before consuming to walk the same entries again.
#[derive(Debug, Clone)]
pub struct Review<'a> {
    questions: &'a [Question],
    answers: &'a [usize],
    next: usize,
}

/// Review `answers` against `questions`.
///
/// Never fails: missing or out-of-range answers produce entries marked
/// with a [`DataIntegrityWarning`].
pub fn review_answers<'a>(questions: &'a [Question], answers: &'a [usize]) -> Review<'a> {
    Review {
        questions,
        answers,
        next: 0,
    }
}

impl<'a> Iterator for Review<'a> {
    type Item = ReviewEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.next;
        let question = self.questions.get(position)?;
        self.next += 1;

        let correct = question.correct_option();
        let answer = self.answers.get(position).copied();
        let chosen = answer.and_then(|a| question.option(a));

        let warning = if correct.is_none() {
            Some(DataIntegrityWarning::CorrectIndexOutOfRange {
                question: position,
                correct: question.correct_answer,
            })
        } else {
            match answer {
                None => Some(DataIntegrityWarning::MissingAnswer { question: position }),
                Some(a) if chosen.is_none() => Some(DataIntegrityWarning::AnswerOutOfRange {
                    question: position,
                    answer: a,
                }),
                Some(_) => None,
            }
        };

        let is_correct = warning.is_none() && answer.is_some_and(|a| question.is_correct(a));

        Some(ReviewEntry {
            position,
            prompt: &question.prompt,
            chosen,
            correct,
            is_correct,
            warning,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.questions.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Review<'_> {}

impl FusedIterator for Review<'_> {}
