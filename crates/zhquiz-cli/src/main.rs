//! zhquiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "zhquiz",
    version,
    about = "Chinese vocabulary, character and grammar drill"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a study session on the terminal
    Run {
        /// Dictionaries to draw from (comma-separated: word, character, grammar)
        #[arg(long, default_value = "word")]
        dictionaries: String,

        /// Direction: chinese-to-english (c2e) or english-to-chinese (e2c)
        #[arg(long)]
        direction: Option<String>,

        /// Maximum number of questions, or "unbounded"
        #[arg(long)]
        limit: Option<String>,

        /// Seed for the question order
        #[arg(long)]
        seed: Option<u64>,

        /// Ask in dictionary order instead of shuffling
        #[arg(long)]
        sorted: bool,

        /// Result log path (overrides config)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Do not print correct/incorrect after each answer
        #[arg(long)]
        no_feedback: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a dictionary file
    Validate {
        /// Path to the dictionary file
        #[arg(long)]
        dictionary: PathBuf,

        /// Kind to assume when the file does not declare one
        #[arg(long)]
        kind: Option<String>,
    },

    /// Summarise study history from the result log
    History {
        /// Result log path (overrides config)
        #[arg(long)]
        log: Option<PathBuf>,

        /// How many of the most-missed items to list
        #[arg(long, default_value = "10")]
        weakest: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, sample dictionaries and rule files
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zhquiz_core=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            dictionaries,
            direction,
            limit,
            seed,
            sorted,
            log,
            no_feedback,
            config,
        } => commands::run::execute(
            dictionaries,
            direction,
            limit,
            seed,
            sorted,
            log,
            no_feedback,
            config,
        ),
        Commands::Validate { dictionary, kind } => commands::validate::execute(dictionary, kind),
        Commands::History {
            log,
            weakest,
            config,
        } => commands::history::execute(log, weakest, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
