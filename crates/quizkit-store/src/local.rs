//! File-backed store.
//!
//! Quizzes come from a directory of TOML quiz files; completions are
//! appended to a JSON lines response log.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use quizkit_core::error::StoreError;
use quizkit_core::model::QuizDefinition;
use quizkit_core::parser::{load_quiz_directory, scan_quiz_directory, DirectoryScan};
use quizkit_core::results::CompletionRecord;
use quizkit_core::traits::{CompletionSink, DefinitionSource, ResponseHistory};

/// Store backed by local files.
#[derive(Debug, Clone)]
pub struct LocalStore {
    quizzes_dir: PathBuf,
    responses_path: PathBuf,
}

impl LocalStore {
    pub fn new(quizzes_dir: impl Into<PathBuf>, responses_path: impl Into<PathBuf>) -> Self {
        Self {
            quizzes_dir: quizzes_dir.into(),
            responses_path: responses_path.into(),
        }
    }

    pub fn responses_path(&self) -> &Path {
        &self.responses_path
    }

    async fn load_all(&self) -> Result<Vec<QuizDefinition>> {
        let dir = self.quizzes_dir.clone();
        tokio::task::spawn_blocking(move || load_quiz_directory(&dir))
            .await
            .context("quiz loader task failed")?
    }

    async fn scan(&self) -> Result<DirectoryScan> {
        let dir = self.quizzes_dir.clone();
        tokio::task::spawn_blocking(move || scan_quiz_directory(&dir))
            .await
            .context("quiz loader task failed")?
    }
}

#[async_trait]
impl DefinitionSource for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<Option<QuizDefinition>> {
        let scan = self.scan().await?;
        if let Some(quiz) = scan.quizzes.into_iter().find(|q| q.id == quiz_id) {
            return Ok(Some(quiz));
        }

        // A file that claims the id but does not load is broken, not missing.
        match scan
            .failures
            .iter()
            .find(|f| f.quiz_id.as_deref() == Some(quiz_id))
        {
            Some(failure) => Err(StoreError::MalformedRecord(format!(
                "quiz '{quiz_id}' in {}: {:#}",
                failure.path.display(),
                failure.error
            ))
            .into()),
            None => Ok(None),
        }
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizDefinition>> {
        self.load_all().await
    }
}

#[async_trait]
impl CompletionSink for LocalStore {
    async fn record_completion(&self, record: &CompletionRecord) -> Result<()> {
        if let Some(parent) = self.responses_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("failed to create directory: {}", parent.display())
                })?;
            }
        }

        let mut line = serde_json::to_string(record).context("failed to serialize response")?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.responses_path)
            .await
            .with_context(|| {
                format!(
                    "failed to open response log: {}",
                    self.responses_path.display()
                )
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ResponseHistory for LocalStore {
    async fn responses_for(&self, user_id: &str) -> Result<Vec<CompletionRecord>> {
        let content = match tokio::fs::read_to_string(&self.responses_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "failed to read response log: {}",
                        self.responses_path.display()
                    )
                })
            }
        };

        let mut responses = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CompletionRecord>(line) {
                Ok(record) if record.user_id == user_id => responses.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "skipping malformed response on line {} of {}: {}",
                        n + 1,
                        self.responses_path.display(),
                        e
                    );
                }
            }
        }
        Ok(responses)
    }
}
