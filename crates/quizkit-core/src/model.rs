//! Core data model types for quizkit.
//!
//! `QuizDefinition` is what a session runs; `QuizRecord` is the loosely
//! shaped row the store hands back, validated into a definition at the
//! boundary.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Text shown to the learner.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
}

impl Question {
    pub fn new(prompt: impl Into<String>, options: &[&str], correct_answer: usize) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
        }
    }

    /// Text of the option at `index`, if it exists.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Text of the correct option, if the correct index is in range.
    pub fn correct_option(&self) -> Option<&str> {
        self.option(self.correct_answer)
    }

    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }

    fn validate(&self, position: usize) -> Result<(), ValidationError> {
        if self.options.len() < 2 {
            return Err(ValidationError::InvalidDefinition(format!(
                "question {position} needs at least 2 options, has {}",
                self.options.len()
            )));
        }
        if self.correct_answer >= self.options.len() {
            return Err(ValidationError::InvalidDefinition(format!(
                "question {position} marks option {} correct but has {} options",
                self.correct_answer,
                self.options.len()
            )));
        }
        Ok(())
    }
}

/// The lesson (and course) a quiz belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRef {
    pub title: String,
    #[serde(default)]
    pub course_title: Option<String>,
}

/// An ordered, immutable set of questions for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lesson: Option<LessonRef>,
    /// Questions in the order they are asked.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            lesson: None,
            questions,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_lesson(mut self, lesson: LessonRef) -> Self {
        self.lesson = Some(lesson);
        self
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Check every invariant a session relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.questions.is_empty() {
            return Err(ValidationError::EmptyQuiz(self.id.clone()));
        }
        self.questions
            .iter()
            .enumerate()
            .try_for_each(|(i, q)| q.validate(i))
    }
}

/// A quiz row as returned by the store, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `null` when the quiz has no question content yet.
    #[serde(default)]
    pub questions: Option<Vec<Question>>,
    #[serde(default)]
    pub lessons: Option<LessonRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LessonRecord {
    pub title: String,
    #[serde(default)]
    pub courses: Option<CourseRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub title: String,
}

impl QuizRecord {
    /// Validate this record into a definition.
    ///
    /// A record without question content takes `fallback` when one is
    /// given and is rejected otherwise.
    pub fn into_definition(
        self,
        fallback: Option<&[Question]>,
    ) -> Result<QuizDefinition, ValidationError> {
        let questions = match (self.questions, fallback) {
            (Some(questions), _) => questions,
            (None, Some(fallback)) => fallback.to_vec(),
            (None, None) => {
                return Err(ValidationError::InvalidDefinition(format!(
                    "quiz '{}' has no question content",
                    self.id
                )))
            }
        };

        let definition = QuizDefinition {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            lesson: self.lessons.map(|l| LessonRef {
                title: l.title,
                course_title: l.courses.map(|c| c.title),
            }),
            questions,
        };
        definition.validate()?;
        Ok(definition)
    }
}
