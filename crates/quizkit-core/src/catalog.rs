//! Quiz catalog with per-user completion status.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::QuizDefinition;
use crate::results::CompletionRecord;
use crate::scoring::average_percent;
use crate::traits::{DefinitionSource, ResponseHistory};

/// One quiz as shown in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub lesson_title: Option<String>,
    pub course_title: Option<String>,
    pub question_count: usize,
    /// The user has at least one stored attempt.
    pub completed: bool,
    /// Highest stored percentage for this quiz.
    pub best_score: Option<f64>,
}

/// All quizzes plus the user's overall average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub quizzes: Vec<QuizListing>,
    pub average_score: Option<f64>,
}

/// Join definitions with stored responses. Listing order follows
/// `definitions`.
pub fn build_catalog(definitions: &[QuizDefinition], responses: &[CompletionRecord]) -> Catalog {
    let mut best: HashMap<&str, f64> = HashMap::new();
    for r in responses {
        let entry = best.entry(r.quiz_id.as_str()).or_insert(r.score);
        if r.score > *entry {
            *entry = r.score;
        }
    }

    let quizzes = definitions
        .iter()
        .map(|d| {
            let best_score = best.get(d.id.as_str()).copied();
            QuizListing {
                id: d.id.clone(),
                title: d.title.clone(),
                description: d.description.clone(),
                lesson_title: d.lesson.as_ref().map(|l| l.title.clone()),
                course_title: d.lesson.as_ref().and_then(|l| l.course_title.clone()),
                question_count: d.len(),
                completed: best_score.is_some(),
                best_score,
            }
        })
        .collect();

    Catalog {
        quizzes,
        average_score: average_percent(responses.iter().map(|r| r.score)),
    }
}

/// The user's most recent stored attempt at `quiz_id`.
pub fn latest_response<'a>(
    responses: &'a [CompletionRecord],
    quiz_id: &str,
) -> Option<&'a CompletionRecord> {
    responses
        .iter()
        .enumerate()
        .filter(|(_, r)| r.quiz_id == quiz_id)
        .max_by_key(|(i, r)| (r.completed_at, *i))
        .map(|(_, r)| r)
}

/// Fetch quizzes and the user's responses concurrently and join them.
pub async fn load_catalog(
    source: &dyn DefinitionSource,
    history: &dyn ResponseHistory,
    user_id: &str,
) -> Result<Catalog> {
    let (definitions, responses) = futures::try_join!(
        async {
            source
                .list_quizzes()
                .await
                .with_context(|| format!("failed to list quizzes from {}", source.name()))
        },
        async {
            history
                .responses_for(user_id)
                .await
                .with_context(|| format!("failed to load responses for '{user_id}'"))
        },
    )?;

    tracing::debug!(
        quizzes = definitions.len(),
        responses = responses.len(),
        "catalog loaded"
    );
    Ok(build_catalog(&definitions, &responses))
}
