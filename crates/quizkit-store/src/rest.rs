//! Hosted backend-as-a-service store over its PostgREST-style HTTP API.
//!
//! Quizzes live in the `quizzes` table (joined with `lessons` and
//! `courses`), finished attempts in `quiz_responses`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::instrument;

use quizkit_core::error::StoreError;
use quizkit_core::model::{Question, QuizDefinition, QuizRecord};
use quizkit_core::results::CompletionRecord;
use quizkit_core::traits::{CompletionSink, DefinitionSource, ResponseHistory};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const QUIZ_SELECT: &str = "*,lessons(title,courses(title))";

/// Client for the hosted store's REST interface.
pub struct RestStore {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    fallback: Option<Vec<Question>>,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
            fallback: None,
            client,
        })
    }

    /// Authorize as a signed-in user instead of with the anonymous key.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// Serve quizzes stored without questions with `questions` instead of
    /// rejecting them.
    pub fn with_fallback_questions(mut self, questions: Vec<Question>) -> Self {
        self.fallback = Some(questions);
        self
    }

    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{table}", self.base_url))
            .with_context(|| format!("invalid store URL: {}", self.base_url))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                StoreError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::AuthenticationFailed(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status,
                message: body,
            });
        }
        Ok(response)
    }

    async fn fetch_rows(&self, url: Url) -> Result<Vec<Value>, StoreError> {
        let response = self.send(self.request(Method::GET, url)).await?;
        response.json().await.map_err(|e| StoreError::ApiError {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })
    }

    fn to_definition(&self, row: Value) -> Result<QuizDefinition, StoreError> {
        let record: QuizRecord = serde_json::from_value(row)
            .map_err(|e| StoreError::MalformedRecord(format!("quiz row: {e}")))?;
        let id = record.id.clone();
        record
            .into_definition(self.fallback.as_deref())
            .map_err(|e| StoreError::MalformedRecord(format!("quiz '{id}': {e}")))
    }
}

#[async_trait]
impl DefinitionSource for RestStore {
    fn name(&self) -> &str {
        "rest"
    }

    #[instrument(skip(self))]
    async fn fetch_quiz(&self, quiz_id: &str) -> Result<Option<QuizDefinition>> {
        let filter = format!("eq.{quiz_id}");
        let url = self.table_url("quizzes", &[("select", QUIZ_SELECT), ("id", &filter)])?;
        let rows = self.fetch_rows(url).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(self.to_definition(row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn list_quizzes(&self) -> Result<Vec<QuizDefinition>> {
        let url = self.table_url("quizzes", &[("select", QUIZ_SELECT)])?;
        let rows = self.fetch_rows(url).await?;

        let mut quizzes = Vec::with_capacity(rows.len());
        for row in rows {
            match self.to_definition(row) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => tracing::warn!("skipping quiz: {e}"),
            }
        }
        Ok(quizzes)
    }
}

#[async_trait]
impl CompletionSink for RestStore {
    #[instrument(skip(self, record), fields(quiz = %record.quiz_id))]
    async fn record_completion(&self, record: &CompletionRecord) -> Result<()> {
        let url = self.table_url("quiz_responses", &[])?;
        self.send(
            self.request(Method::POST, url)
                .header("Prefer", "return=minimal")
                .json(record),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ResponseHistory for RestStore {
    #[instrument(skip(self))]
    async fn responses_for(&self, user_id: &str) -> Result<Vec<CompletionRecord>> {
        let filter = format!("eq.{user_id}");
        let url = self.table_url(
            "quiz_responses",
            &[
                ("select", "*"),
                ("user_id", &filter),
                ("order", "created_at.asc"),
            ],
        )?;
        let rows = self.fetch_rows(url).await?;

        let mut responses = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<CompletionRecord>(row) {
                Ok(record) => responses.push(record),
                Err(e) => tracing::warn!("skipping malformed response row: {e}"),
            }
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::default_questions;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quiz_row(id: &str) -> Value {
        serde_json::json!({
            "id": id,
            "title": "Bias in Hiring",
            "description": "Fair hiring practices",
            "lesson_id": "l-1",
            "questions": [
                {"question": "Best practice?", "options": ["gut feeling", "blind review"], "correct_answer": 1}
            ],
            "lessons": {"title": "Structured Interviews", "courses": {"title": "Unconscious Bias"}}
        })
    }

    #[tokio::test]
    async fn fetch_quiz_by_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/quizzes"))
            .and(query_param("id", "eq.q1"))
            .and(query_param("select", QUIZ_SELECT))
            .and(header("apikey", "anon-key"))
            .and(header("Authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([quiz_row("q1")])))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        let quiz = store.fetch_quiz("q1").await.unwrap().unwrap();
        assert_eq!(quiz.id, "q1");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(
            quiz.lesson.unwrap().course_title.as_deref(),
            Some("Unconscious Bias")
        );
    }

    #[tokio::test]
    async fn missing_quiz_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/quizzes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "key").unwrap();
        assert!(store.fetch_quiz("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn null_questions_use_fallback_only_when_configured() {
        let server = MockServer::start().await;

        let mut row = quiz_row("q2");
        row["questions"] = Value::Null;
        Mock::given(method("GET"))
            .and(path("/rest/v1/quizzes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([row])))
            .mount(&server)
            .await;

        let strict = RestStore::new(&server.uri(), "key").unwrap();
        let err = strict.fetch_quiz("q2").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::MalformedRecord(_))
        ));

        let lenient = RestStore::new(&server.uri(), "key")
            .unwrap()
            .with_fallback_questions(default_questions());
        let quiz = lenient.fetch_quiz("q2").await.unwrap().unwrap();
        assert_eq!(quiz.questions.len(), 3);
    }

    #[tokio::test]
    async fn list_skips_malformed_rows() {
        let server = MockServer::start().await;

        let mut broken = quiz_row("broken");
        broken["questions"][0]["correct_answer"] = serde_json::json!(7);
        Mock::given(method("GET"))
            .and(path("/rest/v1/quizzes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                quiz_row("q1"),
                broken,
                {"id": "no-title"},
            ])))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "key").unwrap();
        let quizzes = store.list_quizzes().await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "q1");
    }

    #[tokio::test]
    async fn record_completion_posts_row() {
        let server = MockServer::start().await;

        let record = CompletionRecord {
            user_id: "user-1".into(),
            quiz_id: "q1".into(),
            score: 66.66666666666666,
            answers: vec![1, 0, 2],
            completed_at: None,
        };

        Mock::given(method("POST"))
            .and(path("/rest/v1/quiz_responses"))
            .and(header("Authorization", "Bearer user-jwt"))
            .and(body_json(&record))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key")
            .unwrap()
            .with_access_token(Some("user-jwt".into()));
        store.record_completion(&record).await.unwrap();
    }

    #[tokio::test]
    async fn auth_failure_is_permanent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/quiz_responses"))
            .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "key").unwrap();
        let record = CompletionRecord {
            user_id: "u".into(),
            quiz_id: "q".into(),
            score: 0.0,
            answers: vec![0],
            completed_at: None,
        };
        let err = store.record_completion(&record).await.unwrap_err();
        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert!(store_err.is_permanent());
        assert!(store_err.to_string().contains("JWT expired"));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/quiz_responses"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "key").unwrap();
        let err = store.responses_for("u").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::ApiError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn responses_for_user() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/quiz_responses"))
            .and(query_param("user_id", "eq.user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "r1", "user_id": "user-1", "quiz_id": "q1", "score": 100, "answers": [1], "created_at": "2024-03-01T12:00:00+00:00"},
                {"id": "r2", "user_id": "user-1", "quiz_id": "q1", "score": 50.5, "answers": "bad"},
            ])))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "key").unwrap();
        let responses = store.responses_for("user-1").await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].score, 100.0);
        assert!(responses[0].completed_at.is_some());
    }
}
