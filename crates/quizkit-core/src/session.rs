//! Quiz session state machine.
//!
//! A session walks `NotStarted -> InProgress(i) -> Finished` for one attempt
//! at one quiz. It is synchronous and does no I/O; the [`crate::engine`]
//! module wires it to the definition source and the completion sink.

use std::sync::Arc;

use crate::error::ValidationError;
use crate::model::{Question, QuizDefinition};
use crate::results::QuizResult;
use crate::scoring::{review_answers, Review};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    /// Waiting on the question at this zero-based index.
    InProgress(usize),
    Finished,
}

/// What `advance` did.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// The last question was answered.
    Finished(QuizResult),
}

/// State of a single attempt.
#[derive(Debug, Clone)]
pub struct QuizSession {
    state: SessionState,
    definition: Option<Arc<QuizDefinition>>,
    pending: Option<usize>,
    answers: Vec<usize>,
    correct: usize,
    result: Option<QuizResult>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::NotStarted,
            definition: None,
            pending: None,
            answers: Vec::new(),
            correct: 0,
            result: None,
        }
    }

    /// Begin a fresh attempt, discarding any previous one.
    ///
    /// Fails without touching the current state if the definition has no
    /// questions or breaks a question invariant.
    pub fn start(&mut self, definition: Arc<QuizDefinition>) -> Result<(), ValidationError> {
        definition.validate()?;

        tracing::info!(
            quiz = %definition.id,
            questions = definition.len(),
            "quiz started"
        );
        *self = Self {
            state: SessionState::InProgress(0),
            definition: Some(definition),
            ..Self::new()
        };
        Ok(())
    }

    /// Choose an option for the current question. Last call wins.
    pub fn select_answer(&mut self, option: usize) -> Result<(), ValidationError> {
        let (index, question) = self.current()?;
        if option >= question.options.len() {
            return Err(ValidationError::OptionOutOfRange {
                question: index,
                index: option,
                options: question.options.len(),
            });
        }
        tracing::debug!(question = index, option, "answer selected");
        self.pending = Some(option);
        Ok(())
    }

    /// Lock in the pending selection and move to the next question, or
    /// finish the attempt after the last one.
    pub fn advance(&mut self) -> Result<Advance, ValidationError> {
        let (index, question) = self.current()?;
        let selected = self.pending.ok_or(ValidationError::NoSelection(index))?;
        let is_correct = question.is_correct(selected);
        let total = self.total();

        self.answers.push(selected);
        if is_correct {
            self.correct += 1;
        }
        self.pending = None;
        tracing::debug!(question = index, selected, is_correct, "answer locked in");

        if index + 1 < total {
            self.state = SessionState::InProgress(index + 1);
            return Ok(Advance::Next(index + 1));
        }

        let quiz_id = self.quiz_id().unwrap_or_default().to_string();
        let result = QuizResult::new(&quiz_id, self.correct, self.answers.clone());
        tracing::info!(
            quiz = %quiz_id,
            correct = result.correct,
            total = result.total,
            percent = result.percent,
            "quiz finished"
        );
        self.state = SessionState::Finished;
        self.result = Some(result.clone());
        Ok(Advance::Finished(result))
    }

    /// Drop the attempt and return to `NotStarted`.
    pub fn reset(&mut self) {
        if self.state != SessionState::NotStarted {
            tracing::debug!(quiz = ?self.quiz_id(), "session reset");
        }
        *self = Self::new();
    }

    /// Per-question breakdown of a finished attempt.
    pub fn review(&self) -> Result<Review<'_>, ValidationError> {
        match (&self.state, &self.definition) {
            (SessionState::Finished, Some(definition)) => {
                Ok(review_answers(&definition.questions, &self.answers))
            }
            (SessionState::NotStarted, _) => Err(ValidationError::NotStarted),
            _ => Err(ValidationError::NotFinished),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn definition(&self) -> Option<&QuizDefinition> {
        self.definition.as_deref()
    }

    pub fn quiz_id(&self) -> Option<&str> {
        self.definition.as_deref().map(|d| d.id.as_str())
    }

    /// The question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        self.current().ok().map(|(_, q)| q)
    }

    pub fn pending_selection(&self) -> Option<usize> {
        self.pending
    }

    /// Answers locked in so far, in question order.
    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    /// Running count of correct answers.
    pub fn score(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.definition.as_deref().map_or(0, QuizDefinition::len)
    }

    /// The result of the finished attempt.
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    fn current(&self) -> Result<(usize, &Question), ValidationError> {
        match (self.state, self.definition.as_deref()) {
            (SessionState::InProgress(i), Some(definition)) => definition
                .questions
                .get(i)
                .map(|q| (i, q))
                .ok_or(ValidationError::NotStarted),
            (SessionState::Finished, _) => Err(ValidationError::AlreadyFinished),
            _ => Err(ValidationError::NotStarted),
        }
    }
}
