//! Quiz engine orchestrator.
//!
//! Drives one [`QuizSession`] for one user, loading definitions from a
//! [`DefinitionSource`] and handing finished results to a
//! [`CompletionSink`]. A sink failure is reported as a
//! [`PersistenceWarning`]; it never rolls back the finished session.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::error::{PersistenceWarning, StoreError, ValidationError};
use crate::model::QuizDefinition;
use crate::results::{CompletionRecord, QuizResult};
use crate::scoring::Review;
use crate::session::{Advance, QuizSession};
use crate::traits::{CompletionSink, DefinitionSource};

/// Outcome of [`QuizEngine::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Moved on to the question at this index.
    Next(usize),
    /// The attempt is over.
    Finished(Completion),
}

/// A finished attempt and how saving it went.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub result: QuizResult,
    /// Set when the completion sink failed.
    pub warning: Option<PersistenceWarning>,
}

/// Runs quiz attempts for a single user.
pub struct QuizEngine {
    source: Arc<dyn DefinitionSource>,
    sink: Arc<dyn CompletionSink>,
    user_id: String,
    session: QuizSession,
    unsaved: Option<CompletionRecord>,
}

impl QuizEngine {
    pub fn new(
        source: Arc<dyn DefinitionSource>,
        sink: Arc<dyn CompletionSink>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            sink,
            user_id: user_id.into(),
            session: QuizSession::new(),
            unsaved: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Load a quiz from the definition source and start an attempt.
    pub async fn start(&mut self, quiz_id: &str) -> Result<()> {
        let definition = self
            .source
            .fetch_quiz(quiz_id)
            .await
            .with_context(|| format!("failed to load quiz '{quiz_id}'"))?
            .ok_or_else(|| StoreError::NotFound(quiz_id.to_string()))?;

        self.start_with(Arc::new(definition))?;
        Ok(())
    }

    /// Start an attempt at an already loaded definition.
    pub fn start_with(&mut self, definition: Arc<QuizDefinition>) -> Result<(), ValidationError> {
        self.session.start(definition)?;
        self.unsaved = None;
        Ok(())
    }

    pub fn select_answer(&mut self, option: usize) -> Result<(), ValidationError> {
        self.session.select_answer(option)
    }

    /// Lock in the current selection. After the last question the result
    /// is sent to the completion sink exactly once.
    pub async fn advance(&mut self) -> Result<Step, ValidationError> {
        match self.session.advance()? {
            Advance::Next(index) => Ok(Step::Next(index)),
            Advance::Finished(result) => {
                let record = result.to_completion(&self.user_id);
                let warning = self.persist(&result, record).await;
                Ok(Step::Finished(Completion { result, warning }))
            }
        }
    }

    /// Resend a completion whose first save failed.
    ///
    /// Returns `Ok(None)` once it is saved, `Ok(Some(_))` if the sink
    /// failed again.
    pub async fn retry_completion(&mut self) -> Result<Option<PersistenceWarning>, ValidationError> {
        let Some(record) = self.unsaved.take() else {
            return Err(ValidationError::NotFinished);
        };
        let Some(result) = self.session.result().cloned() else {
            return Err(ValidationError::NotFinished);
        };
        Ok(self.persist(&result, record).await)
    }

    /// Whether the last finished attempt still needs saving.
    pub fn has_unsaved_completion(&self) -> bool {
        self.unsaved.is_some()
    }

    /// Abandon the attempt. Nothing is persisted.
    pub fn reset(&mut self) {
        self.session.reset();
        self.unsaved = None;
    }

    pub fn review(&self) -> Result<Review<'_>, ValidationError> {
        self.session.review()
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    async fn persist(
        &mut self,
        result: &QuizResult,
        record: CompletionRecord,
    ) -> Option<PersistenceWarning> {
        match self.sink.record_completion(&record).await {
            Ok(()) => {
                tracing::info!(
                    quiz = %record.quiz_id,
                    user = %record.user_id,
                    score = record.score,
                    "completion recorded"
                );
                self.unsaved = None;
                None
            }
            Err(e) => {
                let warning = PersistenceWarning::from_error(&result.quiz_id, result.attempt_id, &e);
                tracing::warn!(
                    quiz = %record.quiz_id,
                    retryable = warning.retryable,
                    "failed to record completion: {e:#}"
                );
                self.unsaved = Some(record);
                Some(warning)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct FakeStore {
        quizzes: Vec<QuizDefinition>,
        saved: Mutex<Vec<CompletionRecord>>,
        fail_saves: AtomicBool,
    }

    impl FakeStore {
        fn new(quizzes: Vec<QuizDefinition>) -> Arc<Self> {
            Arc::new(Self {
                quizzes,
                saved: Mutex::new(Vec::new()),
                fail_saves: AtomicBool::new(false),
            })
        }

        fn saved(&self) -> Vec<CompletionRecord> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DefinitionSource for FakeStore {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_quiz(&self, quiz_id: &str) -> Result<Option<QuizDefinition>> {
            Ok(self.quizzes.iter().find(|q| q.id == quiz_id).cloned())
        }

        async fn list_quizzes(&self) -> Result<Vec<QuizDefinition>> {
            Ok(self.quizzes.clone())
        }
    }

    #[async_trait]
    impl CompletionSink for FakeStore {
        async fn record_completion(&self, record: &CompletionRecord) -> Result<()> {
            if self.fail_saves.load(Ordering::Relaxed) {
                return Err(StoreError::ApiError {
                    status: 503,
                    message: "service unavailable".into(),
                }
                .into());
            }
            self.saved.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn bias_quiz() -> QuizDefinition {
        QuizDefinition::new(
            "bias-101",
            "Bias basics",
            vec![
                Question::new("q1", &["a", "b", "c", "d"], 1),
                Question::new("q2", &["a", "b", "c", "d"], 1),
                Question::new("q3", &["a", "b", "c", "d"], 2),
            ],
        )
    }

    fn engine(store: &Arc<FakeStore>) -> QuizEngine {
        QuizEngine::new(store.clone(), store.clone(), "user-1")
    }

    async fn play(engine: &mut QuizEngine, answers: &[usize]) -> Completion {
        for &a in answers {
            engine.select_answer(a).unwrap();
            if let Step::Finished(completion) = engine.advance().await.unwrap() {
                return completion;
            }
        }
        panic!("quiz did not finish");
    }

    #[tokio::test]
    async fn finished_attempt_is_recorded_once() {
        let store = FakeStore::new(vec![bias_quiz()]);
        let mut engine = engine(&store);
        engine.start("bias-101").await.unwrap();

        let completion = play(&mut engine, &[1, 0, 2]).await;
        assert!(completion.warning.is_none());
        assert_eq!(completion.result.correct, 2);

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].user_id, "user-1");
        assert_eq!(saved[0].quiz_id, "bias-101");
        assert_eq!(saved[0].answers, vec![1, 0, 2]);
        assert!((saved[0].score - 66.666).abs() < 0.01);
        assert!(!engine.has_unsaved_completion());
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let store = FakeStore::new(vec![bias_quiz()]);
        let mut engine = engine(&store);
        let err = engine.start("missing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn empty_quiz_fails_validation() {
        let store = FakeStore::new(vec![QuizDefinition::new("empty", "Empty", vec![])]);
        let mut engine = engine(&store);
        let err = engine.start("empty").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyQuiz("empty".into()))
        );
    }

    #[tokio::test]
    async fn sink_failure_keeps_result_and_allows_retry() {
        let store = FakeStore::new(vec![bias_quiz()]);
        store.fail_saves.store(true, Ordering::Relaxed);
        let mut engine = engine(&store);
        engine.start("bias-101").await.unwrap();

        let completion = play(&mut engine, &[1, 1, 2]).await;
        let warning = completion.warning.expect("save should have failed");
        assert!(warning.retryable);
        assert_eq!(warning.attempt_id, completion.result.attempt_id);
        assert_eq!(completion.result.percent, 100.0);
        assert!(engine.session().is_finished());
        assert!(engine.has_unsaved_completion());

        store.fail_saves.store(false, Ordering::Relaxed);
        assert_eq!(engine.retry_completion().await.unwrap(), None);
        assert_eq!(store.saved().len(), 1);
        assert!(!engine.has_unsaved_completion());
        assert!(engine.retry_completion().await.is_err());
    }

    #[tokio::test]
    async fn abandoned_attempt_is_not_recorded() {
        let store = FakeStore::new(vec![bias_quiz()]);
        let mut engine = engine(&store);
        engine.start("bias-101").await.unwrap();
        engine.select_answer(1).unwrap();
        engine.advance().await.unwrap();
        engine.reset();

        assert!(store.saved().is_empty());
        assert!(engine.review().is_err());
    }

    #[tokio::test]
    async fn review_after_finish() {
        let store = FakeStore::new(vec![bias_quiz()]);
        let mut engine = engine(&store);
        engine.start("bias-101").await.unwrap();
        play(&mut engine, &[0, 1, 2]).await;

        let review: Vec<_> = engine.review().unwrap().collect();
        assert_eq!(review.len(), 3);
        assert!(!review[0].is_correct);
        assert_eq!(review[0].chosen, Some("a"));
        assert_eq!(review[0].correct, Some("b"));
    }
}
