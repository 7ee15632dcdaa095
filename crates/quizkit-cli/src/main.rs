//! quizkit CLI — take quizzes, list them, and review past attempts.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::StoreArgs;

#[derive(Parser)]
#[command(name = "quizkit", version, about = "Quiz sessions and scoring for learning platforms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Quiz ID
        #[arg(long)]
        quiz: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List quizzes and completion status
    List {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Review your latest stored attempt at a quiz
    Review {
        /// Quiz ID
        #[arg(long)]
        quiz: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        path: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizkit=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take { quiz, store } => commands::take::execute(quiz, store).await,
        Commands::List { store } => commands::list::execute(store).await,
        Commands::Review { quiz, store } => commands::review::execute(quiz, store).await,
        Commands::Validate { path } => commands::validate::execute(path),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
