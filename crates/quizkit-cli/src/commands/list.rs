//! The `quizkit list` command.

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use quizkit_core::catalog::load_catalog;
use quizkit_core::scoring::display_percent;

use super::{open_store, StoreArgs};

pub async fn execute(store_args: StoreArgs) -> Result<()> {
    let (store, user) = open_store(&store_args)?;
    let catalog = load_catalog(store.source.as_ref(), store.history.as_ref(), &user).await?;

    if catalog.quizzes.is_empty() {
        println!("No quizzes available yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID", "Title", "Course", "Lesson", "Questions", "Status", "Best",
        ]);

    for quiz in &catalog.quizzes {
        let status = if quiz.completed {
            "Completed"
        } else {
            "Not started"
        };
        let best = quiz
            .best_score
            .map(|s| format!("{}%", display_percent(s)))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&quiz.id),
            Cell::new(&quiz.title),
            Cell::new(quiz.course_title.as_deref().unwrap_or("-")),
            Cell::new(quiz.lesson_title.as_deref().unwrap_or("-")),
            Cell::new(quiz.question_count),
            Cell::new(status),
            Cell::new(best),
        ]);
    }

    println!("{table}");
    match catalog.average_score {
        Some(avg) => println!("Average quiz score: {}%", display_percent(avg)),
        None => println!("No quizzes completed yet."),
    }

    Ok(())
}
