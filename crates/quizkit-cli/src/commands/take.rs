//! The `quizkit take` command.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use quizkit_core::engine::{QuizEngine, Step};

use super::{open_store, write_review, StoreArgs};

pub async fn execute(quiz_id: String, store_args: StoreArgs) -> Result<()> {
    let (store, user) = open_store(&store_args)?;
    let mut engine = QuizEngine::new(store.source, store.sink, user);
    engine.start(&quiz_id).await?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&mut engine, stdin.lock(), &mut stdout.lock()).await
}

/// Drive a started attempt from line-based input.
///
/// Each line is a 1-based option number. `q` or end of input abandons
/// the attempt.
pub async fn run(
    engine: &mut QuizEngine,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(definition) = engine.session().definition() {
        writeln!(out, "{}", definition.title)?;
        if !definition.description.is_empty() {
            writeln!(out, "{}", definition.description)?;
        }
    }

    loop {
        let Some(question) = engine.session().current_question() else {
            return Ok(());
        };
        let position = engine.session().answers().len();
        writeln!(
            out,
            "\nQuestion {} of {}\n{}",
            position + 1,
            engine.session().total(),
            question.prompt
        )?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}) {option}", i + 1)?;
        }
        let option_count = question.options.len();

        let choice = loop {
            write!(out, "Answer [1-{option_count}], q to quit: ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                engine.reset();
                writeln!(out, "\nQuiz abandoned.")?;
                return Ok(());
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                engine.reset();
                writeln!(out, "Quiz abandoned.")?;
                return Ok(());
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=option_count).contains(&n) => break n - 1,
                _ => writeln!(out, "Please choose a number between 1 and {option_count}.")?,
            }
        };

        engine.select_answer(choice)?;
        if let Step::Finished(completion) = engine.advance().await? {
            let result = &completion.result;
            writeln!(
                out,
                "\nQuiz complete! You scored {} out of {} ({}%)\n",
                result.correct,
                result.total,
                result.rounded_percent()
            )?;
            write_review(out, engine.review()?)?;

            if let Some(warning) = completion.warning {
                tracing::warn!(retryable = warning.retryable, "{warning}");
                let warning = if warning.retryable {
                    engine.retry_completion().await?
                } else {
                    Some(warning)
                };
                match warning {
                    Some(warning) => writeln!(out, "\nWarning: {warning}")?,
                    None => writeln!(out, "\nResult saved on retry.")?,
                }
            }
            return Ok(());
        }
    }
}
