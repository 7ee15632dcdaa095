//! The `quizkit validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizkit_core::parser::{lint_quizzes, parse_quiz_file, scan_quiz_directory, DirectoryScan};

pub fn execute(path: PathBuf) -> Result<()> {
    let scan = if path.is_dir() {
        scan_quiz_directory(&path)?
    } else {
        DirectoryScan {
            quizzes: vec![parse_quiz_file(&path)?],
            failures: Vec::new(),
        }
    };

    for quiz in &scan.quizzes {
        println!("Quiz: {} [{}] ({} question(s))", quiz.title, quiz.id, quiz.len());
    }
    for failure in &scan.failures {
        println!("  {} ERROR: {:#}", failure.path.display(), failure.error);
    }

    let warnings = lint_quizzes(&scan.quizzes);
    for w in &warnings {
        let prefix = match w.question {
            Some(q) => format!("  [{} #{}]", w.quiz_id, q + 1),
            None => format!("  [{}]", w.quiz_id),
        };
        println!("{prefix} WARNING: {}", w.message);
    }

    anyhow::ensure!(
        scan.failures.is_empty(),
        "{} quiz file(s) failed validation",
        scan.failures.len()
    );

    if warnings.is_empty() {
        println!("All quizzes valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
