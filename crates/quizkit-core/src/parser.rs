//! TOML quiz file parser.
//!
//! Loads quiz definitions from TOML files and directories, and lints them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{LessonRef, Question, QuizDefinition};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    lesson: Option<String>,
    #[serde(default)]
    course: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
}

/// Parse a single TOML file into a `QuizDefinition`.
pub fn parse_quiz_file(path: &Path) -> Result<QuizDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `QuizDefinition`.
///
/// The result is validated: empty quizzes, questions with fewer than two
/// options, and out-of-range correct answers are errors.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizDefinition> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let lesson = match (parsed.quiz.lesson, parsed.quiz.course) {
        (Some(title), course_title) => Some(LessonRef {
            title,
            course_title,
        }),
        (None, Some(_)) => anyhow::bail!(
            "{}: `course` requires a `lesson`",
            source_path.display()
        ),
        (None, None) => None,
    };

    let definition = QuizDefinition {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        lesson,
        questions: parsed
            .questions
            .into_iter()
            .map(|q| Question {
                prompt: q.question,
                options: q.options,
                correct_answer: q.correct_answer,
            })
            .collect(),
    };

    definition
        .validate()
        .with_context(|| format!("invalid quiz in {}", source_path.display()))?;
    Ok(definition)
}

/// A quiz file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    /// The id the file declares, when its header could be read.
    pub quiz_id: Option<String>,
    pub error: anyhow::Error,
}

/// Everything found in a quiz directory, loaded or not.
#[derive(Debug, Default)]
pub struct DirectoryScan {
    /// Valid quizzes, sorted by id.
    pub quizzes: Vec<QuizDefinition>,
    /// Files that failed to parse or validate, sorted by path.
    pub failures: Vec<LoadFailure>,
}

/// Header-only view of a quiz file, used to name files that fail.
#[derive(Deserialize)]
struct TomlQuizId {
    quiz: TomlIdHeader,
}

#[derive(Deserialize)]
struct TomlIdHeader {
    id: String,
}

/// Recursively load all `.toml` quiz files from a directory, keeping the
/// per-file errors.
pub fn scan_quiz_directory(dir: &Path) -> Result<DirectoryScan> {
    let mut scan = DirectoryScan::default();
    collect_quizzes(dir, &mut scan)?;
    scan.quizzes.sort_by(|a, b| a.id.cmp(&b.id));
    scan.failures.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(scan)
}

/// Recursively load all `.toml` quiz files from a directory.
///
/// Files that fail to parse are skipped with a warning. The result is
/// sorted by quiz id.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizDefinition>> {
    let scan = scan_quiz_directory(dir)?;
    for failure in &scan.failures {
        tracing::warn!("skipping {}: {:#}", failure.path.display(), failure.error);
    }
    Ok(scan.quizzes)
}

fn collect_quizzes(dir: &Path, scan: &mut DirectoryScan) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_quizzes(&path, scan)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    scan.failures.push(LoadFailure {
                        error: anyhow::Error::new(e)
                            .context(format!("failed to read quiz file: {}", path.display())),
                        path,
                        quiz_id: None,
                    });
                    continue;
                }
            };
            match parse_quiz_str(&content, &path) {
                Ok(quiz) => scan.quizzes.push(quiz),
                Err(error) => scan.failures.push(LoadFailure {
                    quiz_id: toml::from_str::<TomlQuizId>(&content)
                        .ok()
                        .map(|h| h.quiz.id),
                    path,
                    error,
                }),
            }
        }
    }

    Ok(())
}

/// A non-fatal issue found while linting a quiz.
#[derive(Debug, Clone)]
pub struct LintWarning {
    /// The quiz id.
    pub quiz_id: String,
    /// The question position (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Lint a quiz for issues that do not stop it from running.
pub fn lint_quiz(quiz: &QuizDefinition) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let warn = |question: Option<usize>, message: String| LintWarning {
        quiz_id: quiz.id.clone(),
        question,
        message,
    };

    if quiz.title.trim().is_empty() {
        warnings.push(warn(None, "title is empty".into()));
    }

    // Duplicate question text
    let mut seen_prompts = HashSet::new();
    for (i, q) in quiz.questions.iter().enumerate() {
        if q.prompt.trim().is_empty() {
            warnings.push(warn(Some(i), "question text is empty".into()));
        } else if !seen_prompts.insert(q.prompt.trim()) {
            warnings.push(warn(Some(i), format!("duplicate question: {}", q.prompt.trim())));
        }
    }

    // Blank or repeated options make the answer ambiguous
    for (i, q) in quiz.questions.iter().enumerate() {
        let mut seen_options = HashSet::new();
        for option in &q.options {
            if option.trim().is_empty() {
                warnings.push(warn(Some(i), "option text is empty".into()));
            } else if !seen_options.insert(option.trim()) {
                warnings.push(warn(Some(i), format!("duplicate option: {}", option.trim())));
            }
        }
    }

    warnings
}

/// Lint a set of quizzes, including cross-quiz checks.
pub fn lint_quizzes(quizzes: &[QuizDefinition]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let mut seen_ids = HashSet::new();
    for quiz in quizzes {
        if !seen_ids.insert(quiz.id.as_str()) {
            warnings.push(LintWarning {
                quiz_id: quiz.id.clone(),
                question: None,
                message: format!("duplicate quiz ID: {}", quiz.id),
            });
        }
        warnings.extend(lint_quiz(quiz));
    }
    warnings
}
