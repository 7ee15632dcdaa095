//! Interfaces to the external quiz store.
//!
//! These async traits are implemented by the `quizkit-store` crate. The
//! engine receives them as constructor arguments and never reaches for a
//! global client.

use async_trait::async_trait;

use crate::model::QuizDefinition;
use crate::results::CompletionRecord;

/// Supplies quiz content.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Human-readable backend name (e.g. "rest").
    fn name(&self) -> &str;

    /// Fetch one quiz. `Ok(None)` means the quiz does not exist.
    async fn fetch_quiz(&self, quiz_id: &str) -> anyhow::Result<Option<QuizDefinition>>;

    /// All quizzes available to learners.
    async fn list_quizzes(&self) -> anyhow::Result<Vec<QuizDefinition>>;
}

/// Persists finished attempts.
#[async_trait]
pub trait CompletionSink: Send + Sync {
    /// Store one completion. Called once per finished attempt.
    async fn record_completion(&self, record: &CompletionRecord) -> anyhow::Result<()>;
}

/// Reads back stored attempts.
#[async_trait]
pub trait ResponseHistory: Send + Sync {
    /// Every stored completion for `user_id`, oldest first.
    async fn responses_for(&self, user_id: &str) -> anyhow::Result<Vec<CompletionRecord>>;
}
