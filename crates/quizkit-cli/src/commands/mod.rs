pub mod init;
pub mod list;
pub mod review;
pub mod take;
pub mod validate;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use quizkit_core::scoring::Review;
use quizkit_store::config::load_config_from;
use quizkit_store::{create_store, StoreConfig, StoreHandle};

/// Options shared by commands that talk to a store.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// User ID recorded with completions (overrides config)
    #[arg(long)]
    pub user: Option<String>,

    /// Read quizzes from this directory instead of the configured store
    #[arg(long)]
    pub quizzes: Option<PathBuf>,

    /// Response log for the local store
    #[arg(long)]
    pub responses: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Resolve the store and user for a command.
pub fn open_store(args: &StoreArgs) -> Result<(StoreHandle, String)> {
    let config = load_config_from(args.config.as_deref())?;

    let mut store_config = match &args.quizzes {
        Some(dir) => StoreConfig::Local {
            quizzes_dir: dir.clone(),
            responses_path: PathBuf::from("./quizkit-results/responses.jsonl"),
        },
        None => config.store.clone(),
    };
    if let (Some(path), StoreConfig::Local { responses_path, .. }) =
        (&args.responses, &mut store_config)
    {
        *responses_path = path.clone();
    }

    let user = args
        .user
        .clone()
        .or(config.user_id)
        .ok_or_else(|| anyhow::anyhow!("no user ID: pass --user or set QUIZKIT_USER"))?;

    tracing::debug!(store = ?store_config, %user, "opening store");
    Ok((create_store(&store_config)?, user))
}

/// Write a per-question breakdown.
pub fn write_review(out: &mut impl Write, review: Review<'_>) -> io::Result<()> {
    for entry in review {
        let mark = if entry.is_correct { "[x]" } else { "[ ]" };
        writeln!(out, "{mark} {}. {}", entry.position + 1, entry.prompt)?;
        if let Some(correct) = entry.correct {
            writeln!(out, "      Correct answer: {correct}")?;
        }
        match (entry.chosen, entry.warning) {
            (_, Some(warning)) => writeln!(out, "      Your answer: unavailable ({warning})")?,
            (Some(chosen), None) if !entry.is_correct => {
                writeln!(out, "      Your answer: {chosen}")?
            }
            _ => {}
        }
    }
    Ok(())
}
