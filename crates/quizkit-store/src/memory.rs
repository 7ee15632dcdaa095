//! In-memory store for testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizkit_core::error::StoreError;
use quizkit_core::model::QuizDefinition;
use quizkit_core::results::CompletionRecord;
use quizkit_core::traits::{CompletionSink, DefinitionSource, ResponseHistory};

/// A store that keeps quizzes and responses in memory.
///
/// Saves can be made to fail to exercise persistence warnings.
pub struct MemoryStore {
    quizzes: Vec<QuizDefinition>,
    responses: Mutex<Vec<CompletionRecord>>,
    fail_saves: AtomicBool,
    save_calls: AtomicU32,
}

impl MemoryStore {
    pub fn new(quizzes: Vec<QuizDefinition>) -> Self {
        Self {
            quizzes,
            responses: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
            save_calls: AtomicU32::new(0),
        }
    }

    /// Seed previously stored responses.
    pub fn with_responses(self, responses: Vec<CompletionRecord>) -> Self {
        *self.responses.lock().unwrap() = responses;
        self
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// Number of save attempts, including failed ones.
    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::Relaxed)
    }

    /// Responses stored so far.
    pub fn responses(&self) -> Vec<CompletionRecord> {
        self.responses.lock().unwrap().clone()
    }
}

#[async_trait]
impl DefinitionSource for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> anyhow::Result<Option<QuizDefinition>> {
        Ok(self.quizzes.iter().find(|q| q.id == quiz_id).cloned())
    }

    async fn list_quizzes(&self) -> anyhow::Result<Vec<QuizDefinition>> {
        Ok(self.quizzes.clone())
    }
}

#[async_trait]
impl CompletionSink for MemoryStore {
    async fn record_completion(&self, record: &CompletionRecord) -> anyhow::Result<()> {
        self.save_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StoreError::NetworkError("store unreachable".into()).into());
        }
        self.responses.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl ResponseHistory for MemoryStore {
    async fn responses_for(&self, user_id: &str) -> anyhow::Result<Vec<CompletionRecord>> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quizkit_core::catalog::load_catalog;
    use quizkit_core::engine::{QuizEngine, Step};
    use quizkit_core::model::Question;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(vec![QuizDefinition::new(
            "q1",
            "First quiz",
            vec![
                Question::new("one", &["a", "b"], 0),
                Question::new("two", &["a", "b"], 1),
            ],
        )]))
    }

    async fn finish(engine: &mut QuizEngine, answers: &[usize]) -> Step {
        let mut last = None;
        for &a in answers {
            engine.select_answer(a).unwrap();
            last = Some(engine.advance().await.unwrap());
        }
        last.unwrap()
    }

    #[tokio::test]
    async fn engine_round_trip_through_memory_store() {
        let store = store();
        let mut engine = QuizEngine::new(store.clone(), store.clone(), "alice");
        engine.start("q1").await.unwrap();

        let Step::Finished(completion) = finish(&mut engine, &[0, 0]).await else {
            panic!("expected finish");
        };
        assert_eq!(completion.result.percent, 50.0);
        assert_eq!(store.save_calls(), 1);
        assert_eq!(store.responses_for("alice").await.unwrap().len(), 1);
        assert!(store.responses_for("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_save_surfaces_warning() {
        let store = store();
        store.set_fail_saves(true);
        let mut engine = QuizEngine::new(store.clone(), store.clone(), "alice");
        engine.start("q1").await.unwrap();

        let Step::Finished(completion) = finish(&mut engine, &[0, 1]).await else {
            panic!("expected finish");
        };
        let warning = completion.warning.unwrap();
        assert!(warning.retryable);
        assert_eq!(completion.result.percent, 100.0);
        assert_eq!(store.save_calls(), 1);
        assert!(store.responses().is_empty());
    }

    #[tokio::test]
    async fn catalog_reflects_completions() {
        let store = store();
        let mut engine = QuizEngine::new(store.clone(), store.clone(), "alice");
        engine.start("q1").await.unwrap();
        finish(&mut engine, &[0, 1]).await;

        let catalog = load_catalog(store.as_ref(), store.as_ref(), "alice")
            .await
            .unwrap();
        assert!(catalog.quizzes[0].completed);
        assert_eq!(catalog.average_score, Some(100.0));

        let catalog = load_catalog(store.as_ref(), store.as_ref(), "bob")
            .await
            .unwrap();
        assert!(!catalog.quizzes[0].completed);
    }
}
