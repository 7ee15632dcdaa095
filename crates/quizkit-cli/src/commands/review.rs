//! The `quizkit review` command.

use std::io;

use anyhow::Result;

use quizkit_core::catalog::latest_response;
use quizkit_core::error::StoreError;
use quizkit_core::scoring::{count_correct, display_percent, review_answers};

use super::{open_store, write_review, StoreArgs};

pub async fn execute(quiz_id: String, store_args: StoreArgs) -> Result<()> {
    let (store, user) = open_store(&store_args)?;

    let (definition, responses) = tokio::try_join!(
        store.source.fetch_quiz(&quiz_id),
        store.history.responses_for(&user),
    )?;
    let definition = definition.ok_or_else(|| StoreError::NotFound(quiz_id.clone()))?;

    let Some(record) = latest_response(&responses, &quiz_id) else {
        println!("No attempts at '{}' yet.", definition.title);
        return Ok(());
    };

    let review = review_answers(&definition.questions, &record.answers);
    let degraded = review.clone().filter(|e| !e.is_valid()).count();
    if degraded > 0 {
        tracing::warn!(
            quiz = %quiz_id,
            degraded,
            "stored answers do not match the current quiz"
        );
    }

    println!("{}", definition.title);
    if let Some(at) = record.completed_at {
        println!("Attempted {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!(
        "Score: {}% ({} of {} correct)\n",
        display_percent(record.score),
        count_correct(&definition.questions, &record.answers),
        definition.len()
    );
    write_review(&mut io::stdout().lock(), review)?;

    Ok(())
}
