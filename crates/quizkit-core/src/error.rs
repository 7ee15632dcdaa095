//! Error and warning types.
//!
//! `ValidationError` covers rejected session operations and malformed quiz
//! input. `StoreError` represents failures of the external store and is
//! defined here so the engine can classify sink errors by downcasting
//! instead of matching on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A rejected operation or malformed input. Never changes session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The quiz definition has no questions.
    #[error("quiz '{0}' has no questions")]
    EmptyQuiz(String),

    /// The selected option does not exist for the current question.
    #[error("option {index} is out of range for question {question} ({options} options)")]
    OptionOutOfRange {
        question: usize,
        index: usize,
        options: usize,
    },

    /// `advance` was called before an option was selected.
    #[error("no answer selected for question {0}")]
    NoSelection(usize),

    /// The operation needs a quiz in progress but none was started.
    #[error("no quiz in progress")]
    NotStarted,

    /// The session already reached its terminal state.
    #[error("quiz is already finished")]
    AlreadyFinished,

    /// Review was requested before the last question was answered.
    #[error("quiz is not finished yet")]
    NotFinished,

    /// A quiz definition or store record failed schema validation.
    #[error("invalid quiz definition: {0}")]
    InvalidDefinition(String),
}

/// Errors that can occur when talking to the quiz store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested quiz does not exist.
    #[error("quiz not found: {0}")]
    NotFound(String),

    /// The store rejected our credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The store returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A record could not be mapped onto the quiz schema.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` if resending the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StoreError::AuthenticationFailed(_)
                | StoreError::NotFound(_)
                | StoreError::MalformedRecord(_)
        )
    }
}

/// The completion sink failed. The result it was carrying stays valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceWarning {
    pub quiz_id: String,
    pub attempt_id: Uuid,
    pub message: String,
    /// Whether a retry could plausibly succeed.
    pub retryable: bool,
}

impl PersistenceWarning {
    pub(crate) fn from_error(quiz_id: &str, attempt_id: Uuid, error: &anyhow::Error) -> Self {
        let retryable = error
            .downcast_ref::<StoreError>()
            .map(|e| !e.is_permanent())
            .unwrap_or(true);
        Self {
            quiz_id: quiz_id.to_string(),
            attempt_id,
            message: format!("{error:#}"),
            retryable,
        }
    }
}

impl std::fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not save result for quiz '{}': {}",
            self.quiz_id, self.message
        )
    }
}

/// An assumed invariant did not hold for stored data. Review degrades
/// the affected entry instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// The recorded answer points past the question's options.
    AnswerOutOfRange { question: usize, answer: usize },
    /// No answer was recorded for this question.
    MissingAnswer { question: usize },
    /// The question's correct index points past its options.
    CorrectIndexOutOfRange { question: usize, correct: usize },
}

impl std::fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataIntegrityWarning::AnswerOutOfRange { question, answer } => {
                write!(f, "answer {answer} is out of range for question {question}")
            }
            DataIntegrityWarning::MissingAnswer { question } => {
                write!(f, "no answer recorded for question {question}")
            }
            DataIntegrityWarning::CorrectIndexOutOfRange { question, correct } => write!(
                f,
                "correct answer {correct} is out of range for question {question}"
            ),
        }
    }
}
