//! The `quizkit init` command.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use quizkit_core::model::Question;
use quizkit_store::fallback::default_questions;

#[derive(Serialize)]
struct ExampleQuizFile {
    quiz: ExampleHeader,
    questions: Vec<Question>,
}

#[derive(Serialize)]
struct ExampleHeader {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    lesson: &'static str,
    course: &'static str,
}

pub fn execute() -> Result<()> {
    // Create quizkit.toml
    if Path::new("quizkit.toml").exists() {
        println!("quizkit.toml already exists, skipping.");
    } else {
        std::fs::write("quizkit.toml", SAMPLE_CONFIG)?;
        println!("Created quizkit.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, example_quiz()?)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set user_id in quizkit.toml (or export QUIZKIT_USER)");
    println!("  2. Run: quizkit validate --path quizzes");
    println!("  3. Run: quizkit take --quiz unconscious-bias-101");

    Ok(())
}

fn example_quiz() -> Result<String> {
    let file = ExampleQuizFile {
        quiz: ExampleHeader {
            id: "unconscious-bias-101",
            title: "Understanding Unconscious Bias",
            description: "Check what you took away from the introductory lesson",
            lesson: "What is unconscious bias?",
            course: "Inclusive Workplaces",
        },
        questions: default_questions(),
    };
    toml::to_string(&file).context("failed to render example quiz")
}

const SAMPLE_CONFIG: &str = r#"# quizkit configuration

user_id = "local-user"

[store]
type = "local"
quizzes_dir = "./quizzes"
responses_path = "./quizkit-results/responses.jsonl"

# Hosted backend:
# [store]
# type = "rest"
# base_url = "https://your-project.example.co"
# api_key = "${QUIZKIT_API_KEY}"
# access_token = "${QUIZKIT_ACCESS_TOKEN}"
# use_default_questions = true
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_quiz_parses() {
        let content = example_quiz().unwrap();
        let quiz =
            quizkit_core::parser::parse_quiz_str(&content, Path::new("example.toml")).unwrap();
        assert_eq!(quiz.id, "unconscious-bias-101");
        assert_eq!(quiz.questions, default_questions());
        assert!(quizkit_core::parser::lint_quiz(&quiz).is_empty());
    }

    #[test]
    fn sample_config_parses() {
        let config: quizkit_store::QuizkitConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.user_id.as_deref(), Some("local-user"));
        assert!(matches!(
            config.store,
            quizkit_store::StoreConfig::Local { .. }
        ));
    }
}
